use super::RemoteQueryError;

/// Tabular SELECT results: variable names and one value row per solution.
///
/// Unbound values are empty strings, as in the SPARQL CSV results format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResults {
    variables: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl QueryResults {
    /// Results holding a single variable, one row per value.
    pub fn single_column(variable: &str, values: impl IntoIterator<Item = String>) -> Self {
        Self {
            variables: vec![variable.to_string()],
            rows: values.into_iter().map(|value| vec![value]).collect(),
        }
    }

    /// Parse a `text/csv` SPARQL results document.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, RemoteQueryError> {
        let malformed = |err: csv::Error| RemoteQueryError::MalformedResponse {
            reason: err.to_string(),
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);
        let variables: Vec<String> = reader
            .headers()
            .map_err(malformed)?
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        if variables.iter().all(|name| name.is_empty()) {
            return Err(RemoteQueryError::MalformedResponse {
                reason: "missing header row".to_string(),
            });
        }
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(malformed)?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { variables, rows })
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every value bound to `variable`, in row order.
    pub fn column(&self, variable: &str) -> Result<Vec<&str>, RemoteQueryError> {
        let idx = self
            .variables
            .iter()
            .position(|name| name == variable)
            .ok_or_else(|| RemoteQueryError::MalformedResponse {
                reason: format!(
                    "no ?{variable} column in results (got {})",
                    self.variables.join(", ")
                ),
            })?;
        Ok(self
            .rows
            .iter()
            .filter_map(|row| row.get(idx).map(String::as_str))
            .collect())
    }
}
