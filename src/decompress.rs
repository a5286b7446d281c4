//! # Payload Acquisition and Decompression
//!
//! The only async stage of the pipeline. Payloads are materialized fully
//! in memory in a single pass; activity files are small enough (a long
//! ride is a few megabytes) that streaming decoding would buy nothing, and
//! every parser wants the whole document anyway.
//!
//! Two axes: the payload either carries a gzip layer or it does not, and
//! the target format either wants raw bytes (FIT) or UTF-8 text (the XML
//! formats). A gzip failure is reported as [`SummaryError::Decompression`];
//! inflated-but-not-UTF-8 text is a parse failure of the target format.

use async_compression::tokio::bufread::GzipDecoder;
use log::debug;
use tokio::io::{AsyncBufRead, AsyncReadExt};

use crate::error::{Result, SummaryError};
use crate::format::ActivityFormat;

/// Read an uncompressed payload to its end.
pub async fn read_bytes<R>(mut reader: R) -> Result<Vec<u8>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer).await?;
    Ok(buffer)
}

/// Read an uncompressed payload as UTF-8 text.
pub async fn read_text<R>(reader: R, format: ActivityFormat) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    decode_text(read_bytes(reader).await?, format)
}

/// Remove the gzip layer from a payload, yielding the inner bytes.
pub async fn inflate_bytes<R>(reader: R) -> Result<Vec<u8>>
where
    R: AsyncBufRead + Unpin,
{
    let mut decoder = GzipDecoder::new(reader);
    let mut buffer = Vec::new();
    decoder
        .read_to_end(&mut buffer)
        .await
        .map_err(|e| SummaryError::Decompression {
            message: e.to_string(),
        })?;
    debug!("[Decompress] inflated payload to {} bytes", buffer.len());
    Ok(buffer)
}

/// Remove the gzip layer from a payload, yielding the inner UTF-8 text.
pub async fn inflate_text<R>(reader: R, format: ActivityFormat) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    decode_text(inflate_bytes(reader).await?, format)
}

fn decode_text(bytes: Vec<u8>, format: ActivityFormat) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| SummaryError::FormatParse {
        format,
        message: format!("payload is not valid UTF-8: {}", e),
    })
}
