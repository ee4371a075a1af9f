use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Write a training log with one epoch line per `(train, valid)` pair.
pub fn write_training_log(dir: &Path, name: &str, losses: &[(f64, f64)]) -> PathBuf {
    let mut text = String::new();
    text.push_str("2024-05-02 08:00:00,000 - INFO: Start time: 2024-05-02 08:00:00\n");
    text.push_str("2024-05-02 08:00:01,000 - INFO: Number of entities : 5000\n");
    text.push_str("2024-05-02 08:00:01,000 - INFO: Number of relation types : 12\n");
    text.push_str("2024-05-02 08:00:01,000 - INFO: Number of triples : 40000\n");
    text.push_str("2024-05-02 08:00:01,000 - INFO: keywords : ['indirect']\n");
    text.push_str("2024-05-02 08:00:02,000 - INFO: method : DistMult\n");
    text.push_str("2024-05-02 08:00:02,000 - INFO: batch_size : 128\n");
    writeln!(
        text,
        "2024-05-02 08:00:02,000 - INFO: n_epochs : {}",
        losses.len()
    )
    .unwrap();
    for (idx, (train, valid)) in losses.iter().enumerate() {
        writeln!(
            text,
            "2024-05-02 08:{:02}:00,000 - INFO - Epoch {} | Train loss: {train}, Valid loss: {valid} | 2.5s",
            idx % 60,
            idx + 1
        )
        .unwrap();
    }
    text.push_str("2024-05-02 09:00:00,000 - INFO: Training of Embedding Model done\n");
    text.push_str("2024-05-02 09:20:30,000 - INFO: Classifier trained\n");
    text.push_str("2024-05-02 09:20:31,000 - INFO: Hit@1 : 0.275\n");
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}
