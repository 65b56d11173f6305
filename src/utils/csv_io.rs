use crate::utils::error::{EtlError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// 解析帶標頭的分隔文字，欄位依 serde rename 對應
pub fn read_records<T: DeserializeOwned>(data: &[u8], delimiter: u8, dataset: &str) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::Headers)
        .from_reader(data);

    reader
        .deserialize()
        .enumerate()
        .map(|(index, row)| {
            row.map_err(|e| {
                // +2: header line, 1-based numbering
                EtlError::input(dataset, format!("row {}: {}", index + 2, e))
            })
        })
        .collect()
}

pub fn write_records<T: Serialize>(records: &[T], with_header: bool) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(Vec::new());

    for record in records {
        writer.serialize(record)?;
    }

    writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to flush CSV output: {}", e),
    })
}
