use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use comfy_table::Table;
use tracing::{debug, info, info_span, warn};

use hstat_ingest::{
    IngestOptions, batches, column_union, read_dataset, read_records, write_records,
};
use hstat_model::{Filter, Record};
use hstat_query::{
    EnumerationOptions, MemoryIndex, QueryError, SearchIndex, compile_filter,
    enumerate_distinct_terms,
};
use hstat_transform::{RuleTable, TransformerRegistry};

use crate::cli::{FilterArgs, RulesArgs, SearchArgs, TermsArgs, TransformArgs};
use crate::summary::{apply_table_style, header_cell, record_table};
use crate::types::TransformResult;

const TRANSFORMED_SUFFIX: &str = "transformed.csv";

pub fn run_transform(args: &TransformArgs) -> Result<TransformResult> {
    let dataset = read_dataset(&args.input)
        .with_context(|| format!("read dataset {}", args.input.display()))?;
    let span = info_span!("transform", dataset = %dataset.name);
    let _guard = span.enter();
    let start = Instant::now();

    let names = if args.transformers.is_empty() {
        dataset.metadata.transformers.clone()
    } else {
        args.transformers.clone()
    };
    if names.is_empty() {
        warn!("no transformers configured, records are only stamped with originals");
    }
    let mut chain = TransformerRegistry::new(&args.rules_dir)
        .build_chain(&names)
        .context("build transform chain")?;

    let input_records = dataset.records.len();
    let outcome = chain.apply(dataset.records);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    write_records(&output, &outcome.records)
        .with_context(|| format!("write {}", output.display()))?;

    let reports_dir = match &args.reports_dir {
        Some(dir) => dir.clone(),
        None => parent_dir(&output),
    };
    let failure_reports = chain.failure_reports();
    if !failure_reports.is_empty() {
        fs::create_dir_all(&reports_dir)
            .with_context(|| format!("create reports directory {}", reports_dir.display()))?;
    }
    let mut reports = Vec::with_capacity(failure_reports.len());
    for report in &failure_reports {
        let path = report
            .write_to_dir(&reports_dir)
            .with_context(|| format!("write unmatched report for {}", report.transformer))?;
        reports.push(path);
    }

    info!(
        input_records,
        output_records = outcome.records.len(),
        rejected = outcome.rejected.len(),
        reports = reports.len(),
        duration_ms = start.elapsed().as_millis(),
        "transform complete"
    );
    Ok(TransformResult {
        dataset: dataset.name,
        input_records,
        output_records: outcome.records.len(),
        output,
        stages: outcome.stats,
        rejected: outcome.rejected,
        reports,
    })
}

pub fn run_rules(args: &RulesArgs) -> Result<()> {
    let table = RuleTable::from_path(&args.path)
        .with_context(|| format!("load rule table {}", args.path.display()))?;
    let mut rendered = Table::new();
    rendered.set_header(table.header().iter().map(|column| header_cell(column)));
    apply_table_style(&mut rendered);
    for row in table.rows() {
        rendered.add_row(row);
    }
    println!("{rendered}");
    println!(
        "{} rules, {} distinct keys, key columns: {}",
        table.len(),
        table.key_count(),
        table.key_columns().join(", ")
    );
    Ok(())
}

pub fn run_search(args: &SearchArgs) -> Result<Vec<Record>> {
    let filter = load_filter(&args.filter)?;
    if filter.is_empty() && !args.all {
        return Err(QueryError::EmptyFilter).context("pass --filter, --filter-file, or --all");
    }
    let records = read_records(&args.input)
        .with_context(|| format!("read {}", args.input.display()))?;
    let index = build_index(&args.input, &records, args.batch_size)?;
    let query = compile_filter(&filter);
    if args.explain {
        let rendered =
            serde_json::to_string_pretty(&query.to_json()).context("render compiled query")?;
        println!("{rendered}");
    }
    let hits = index.search(&query, args.limit).context("search")?;
    println!("{}", record_table(&hits, &column_union(&hits)));
    println!("{} of {} records shown", hits.len(), index.len());
    Ok(hits)
}

pub fn run_terms(args: &TermsArgs) -> Result<Vec<Record>> {
    let filter = load_filter(&args.filter)?;
    let dataset = read_dataset(&args.input)
        .with_context(|| format!("read dataset {}", args.input.display()))?;
    for field in &args.fields {
        if let Some(description) = dataset.metadata.description_of(field) {
            println!("{field}: {description}");
        }
    }
    let index = build_index(&args.input, &dataset.records, args.batch_size)?;
    let options = EnumerationOptions::default()
        .with_page_size(args.page_size)
        .with_max_pages(args.max_pages);
    let combinations = enumerate_distinct_terms(&index, &args.fields, &filter, &options)
        .context("enumerate distinct terms")?;
    let rows: Vec<Record> = combinations.into_iter().map(Record::from).collect();
    println!("{}", record_table(&rows, &args.fields));
    println!("{} distinct combinations", rows.len());
    Ok(rows)
}

/// Parse the filter given on the command line. No flag means no filter.
pub fn load_filter(args: &FilterArgs) -> Result<Filter> {
    if let Some(text) = &args.filter {
        return Filter::from_json(text).context("parse --filter");
    }
    if let Some(path) = &args.filter_file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read filter file {}", path.display()))?;
        return Filter::from_json(&text)
            .with_context(|| format!("parse filter file {}", path.display()));
    }
    Ok(Filter::new())
}

fn build_index(path: &Path, records: &[Record], batch_size: usize) -> Result<MemoryIndex> {
    if records.is_empty() {
        bail!("{} has no records", path.display());
    }
    let options = IngestOptions::default().with_batch_size(batch_size);
    let mut index = MemoryIndex::new();
    for (number, batch) in batches(records, &options).enumerate() {
        index.index_batch(batch.iter().cloned());
        debug!(batch = number + 1, size = batch.len(), "indexed batch");
    }
    Ok(index)
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `data/survey.csv` becomes `data/survey.transformed.csv`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    input.with_file_name(format!("{stem}.{TRANSFORMED_SUFFIX}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_sits_next_to_input() {
        assert_eq!(
            default_output_path(Path::new("data/survey.csv")),
            Path::new("data/survey.transformed.csv")
        );
    }

    #[test]
    fn relative_output_reports_to_current_dir() {
        assert_eq!(parent_dir(Path::new("out.csv")), PathBuf::from(""));
        assert_eq!(parent_dir(Path::new("out/x.csv")), PathBuf::from("out"));
    }

    #[test]
    fn missing_filter_flags_mean_no_filter() {
        let filter = load_filter(&FilterArgs::default()).unwrap();
        assert!(filter.is_empty());
    }
}
