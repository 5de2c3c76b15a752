//! Export of the concept co-occurrence network as Gephi spreadsheets
//!
//! Gephi imports graphs from a pair of comma-separated tables: one that lists
//! nodes and one that lists edges between them.

use crate::{
    analysis::{cooccurrence::Network, display_name},
    config::GephiConfig,
    table, Result,
};
use anyhow::Context;
use csv_async::AsyncWriterBuilder;
use serde::Serialize;
use std::path::Path;
use tokio::{
    fs::File,
    io::{AsyncWriteExt, BufWriter},
};

/// Row of the node table
#[derive(Debug, Serialize)]
struct NodeRow<'network> {
    #[serde(rename = "Id")]
    id: &'network str,

    #[serde(rename = "Label")]
    label: String,

    /// Number of reviews mentioning the concept
    #[serde(rename = "Weight")]
    weight: usize,
}

/// Row of the edge table
#[derive(Debug, Serialize)]
struct EdgeRow<'network> {
    #[serde(rename = "Source")]
    source: &'network str,

    #[serde(rename = "Target")]
    target: &'network str,

    /// Number of reviews mentioning both concepts
    #[serde(rename = "Weight")]
    weight: usize,

    #[serde(rename = "Type")]
    kind: &'static str,
}

/// Load the review table, build its co-occurrence network and export it
pub async fn run(config: &GephiConfig) -> Result<()> {
    let table = table::load_with_fallback(&config.input, &config.fallback).await?;
    let network = Network::build(&table, &config.lexicon.network);
    save(&network, &config.nodes, &config.edges).await?;
    log::info!(
        "Exported {} nodes to {} and {} edges to {}",
        network.nodes.len(),
        config.nodes.display(),
        network.edges.len(),
        config.edges.display()
    );
    Ok(())
}

/// Write down the node and edge tables of a network
///
/// Every edge is exported, not just the heaviest ones. Nodes are identified by
/// their concept name and labeled with its human-readable form.
pub async fn save(network: &Network<'_>, nodes: &Path, edges: &Path) -> Result<()> {
    write_rows(
        nodes,
        network.nodes.iter().map(|(&id, &weight)| NodeRow {
            id,
            label: display_name(id),
            weight,
        }),
    )
    .await
    .with_context(|| format!("writing the node table to {}", nodes.display()))?;
    write_rows(
        edges,
        network
            .edges
            .iter()
            .map(|(&(source, target), &weight)| EdgeRow {
                source,
                target,
                weight,
                kind: "Undirected",
            }),
    )
    .await
    .with_context(|| format!("writing the edge table to {}", edges.display()))
}

/// Write rows to a CSV file with a header, overwriting any previous content
async fn write_rows(path: &Path, rows: impl Iterator<Item = impl Serialize>) -> Result<()> {
    let mut output = BufWriter::new(File::create(path).await.context("creating the file")?);
    {
        let mut writer = AsyncWriterBuilder::new().create_serializer(&mut output);
        for row in rows {
            writer.serialize(row).await.context("writing down a row")?;
        }
        writer.flush().await.context("flushing rows")?;
    }
    output.shutdown().await.context("closing the file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analysis::tests::table, lexicon::Lexicon};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn node_and_edge_tables() {
        let dir = tempfile::tempdir().unwrap();
        let (nodes, edges) = (dir.path().join("nodes.csv"), dir.path().join("edges.csv"));
        let table = table(&[
            ("The combat is all about audio", true, 0),
            ("a blind-friendly story", true, 0),
            ("nothing to see here", false, 0),
        ]);
        let lexicon = Lexicon::default();
        let network = Network::build(&table, &lexicon.network);
        save(&network, &nodes, &edges).await.unwrap();

        let nodes = tokio::fs::read_to_string(&nodes).await.unwrap();
        assert_eq!(
            nodes.lines().collect::<Vec<_>>(),
            [
                "Id,Label,Weight",
                "Audio_Espacial,Audio Espacial,1",
                "Combate,Combate,1",
                "Acessibilidade,Acessibilidade,1",
                "Narrativa,Narrativa,1",
            ]
        );
        let edges = tokio::fs::read_to_string(&edges).await.unwrap();
        assert_eq!(
            edges.lines().collect::<Vec<_>>(),
            [
                "Source,Target,Weight,Type",
                "Audio_Espacial,Combate,1,Undirected",
                "Acessibilidade,Narrativa,1,Undirected",
            ]
        );
    }

    #[tokio::test]
    async fn missing_tables() {
        let dir = tempfile::tempdir().unwrap();
        let config = GephiConfig::new(
            dir.path().join("missing.tsv"),
            dir.path().join("missing.csv"),
            Lexicon::default(),
            dir.path().join("nodes.csv"),
            dir.path().join("edges.csv"),
        );
        let error = format!("{:#}", run(&config).await.unwrap_err());
        assert!(error.contains("no input table available"), "{error}");
    }
}
