//! Flat review table storage
//!
//! The table is a delimited text file with one header row, as produced by the
//! `collect` stage (tab-separated) or exported from a spreadsheet
//! (comma-separated). Files whose name ends in ".gz" are gzip-compressed.

use crate::{
    review::{Review, TableRow},
    Result,
};
use anyhow::Context;
use async_compression::tokio::{bufread::GzipDecoder, write::GzipEncoder};
use csv_async::{AsyncReaderBuilder, AsyncWriterBuilder, StringRecord, Trim};
use futures::StreamExt;
use std::{collections::HashSet, io::ErrorKind, path::Path};
use tokio::{
    fs::File,
    io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter},
};

/// Review table loaded in memory
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Table {
    /// Columns that were present in the source file
    pub columns: Columns,

    /// Reviews, in file order
    ///
    /// Cells from missing columns hold neutral values, so you should check
    /// `columns` before interpreting them.
    pub reviews: Vec<Review>,
}
//
#[cfg(test)]
impl Table {
    /// Build a table where every column is known
    pub fn from_reviews(reviews: Vec<Review>) -> Self {
        Self {
            columns: Columns::all(),
            reviews,
        }
    }
}

/// Columns of the review table
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Columns {
    pub playtime: bool,
    pub language: bool,
    pub text: bool,
    pub recommended: bool,
    pub helpful_votes: bool,
    pub created_at: bool,
}
//
impl Columns {
    /// Every column is present
    #[cfg(test)]
    pub fn all() -> Self {
        Self {
            playtime: true,
            language: true,
            text: true,
            recommended: true,
            helpful_votes: true,
            created_at: true,
        }
    }

    /// Find out which columns a header row provides
    ///
    /// Headers must match exactly, like they do during row decoding, so they
    /// should be trimmed beforehand if needed.
    pub fn from_headers(headers: &StringRecord) -> Self {
        let has = |name: &str| headers.iter().any(|header| header == name);
        Self {
            playtime: has("Horas Jogadas"),
            language: has("Idioma"),
            text: has("Review"),
            recommended: has("Recomendado"),
            helpful_votes: has("Votos Úteis"),
            created_at: has("Data da Review"),
        }
    }
}

/// Drop reviews whose (text, creation time) was already seen
///
/// The first occurence wins, so reviews should be provided in merge order.
pub fn dedup(reviews: Vec<Review>) -> Vec<Review> {
    let mut seen = HashSet::with_capacity(reviews.len());
    let mut result = Vec::with_capacity(reviews.len());
    for review in reviews {
        if seen.insert((review.text.clone(), review.created_at)) {
            result.push(review);
        } else {
            log::trace!("Dropped duplicate review {:?}", review.dedup_key());
        }
    }
    result
}

/// Save reviews as a tab-separated table, overwriting any previous content
pub async fn save(path: &Path, reviews: &[Review]) -> Result<()> {
    let file = File::create(path).await.context("creating the table file")?;
    let mut output: Box<dyn AsyncWrite + Send + Unpin> = if is_gzipped(path) {
        Box::new(GzipEncoder::new(BufWriter::new(file)))
    } else {
        Box::new(BufWriter::new(file))
    };
    {
        let mut writer = AsyncWriterBuilder::new()
            .delimiter(b'\t')
            .create_serializer(&mut output);
        for review in reviews {
            writer
                .serialize(review)
                .await
                .context("writing down a review")?;
        }
        writer.flush().await.context("flushing the review table")?;
    }
    // Shutting down also writes the gzip trailer, if any
    output.shutdown().await.context("closing the table file")?;
    Ok(())
}

/// Load a table, falling back to another one if the first does not exist
pub async fn load_with_fallback(primary: &Path, fallback: &Path) -> Result<Table> {
    match open(primary).await {
        Ok(input) => {
            return load_from(input, delimiter(primary))
                .await
                .with_context(|| format!("loading {}", primary.display()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::warn!(
                "Review table {} not found, trying {} instead",
                primary.display(),
                fallback.display()
            );
        }
        Err(e) => return Err(e).with_context(|| format!("opening {}", primary.display())),
    }
    load(fallback).await.with_context(|| {
        format!(
            "no input table available (tried {} and {})",
            primary.display(),
            fallback.display()
        )
    })
}

/// Load a table
pub async fn load(path: &Path) -> Result<Table> {
    let input = open(path)
        .await
        .with_context(|| format!("opening {}", path.display()))?;
    load_from(input, delimiter(path))
        .await
        .with_context(|| format!("loading {}", path.display()))
}

/// Open a table file, decompressing it if needed
async fn open(path: &Path) -> std::io::Result<Box<dyn AsyncRead + Send + Unpin>> {
    let file = BufReader::new(File::open(path).await?);
    Ok(if is_gzipped(path) {
        Box::new(GzipDecoder::new(file))
    } else {
        Box::new(file)
    })
}

/// Decode a table from a stream of bytes
async fn load_from(input: impl AsyncRead + Send + Unpin, delimiter: u8) -> Result<Table> {
    let mut reader = AsyncReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        // Spreadsheet exports often pad headers with spaces
        .trim(Trim::Headers)
        .create_deserializer(input);
    let columns = Columns::from_headers(reader.headers().await.context("reading table headers")?);
    if !columns.text {
        log::warn!("Review table has no review text column, text analytics will be empty");
    }
    let mut reviews = Vec::new();
    let mut rows = reader.into_deserialize::<TableRow>();
    while let Some(row) = rows.next().await {
        let row = row.with_context(|| format!("decoding table row {}", reviews.len() + 1))?;
        reviews.push(Review::from(row));
    }
    Ok(Table { columns, reviews })
}

/// Truth that a table file is gzip-compressed
fn is_gzipped(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Field delimiter of a table file, inferred from its extension
fn delimiter(path: &Path) -> u8 {
    let path = if is_gzipped(path) {
        Path::new(path.file_stem().unwrap_or_default())
    } else {
        path
    };
    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
        _ => b'\t',
    }
}
