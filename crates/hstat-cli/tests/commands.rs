//! Integration tests for the `hstat` commands.

use std::fs;
use std::path::{Path, PathBuf};

use hstat_cli::cli::{FilterArgs, RulesArgs, SearchArgs, TermsArgs, TransformArgs};
use hstat_cli::commands::{load_filter, run_rules, run_search, run_terms, run_transform};
use hstat_query::QueryError;
use tempfile::TempDir;

const SURVEY: &str = "\
source,indicator,entity.state,entity.district,duration.start,duration.end,value
NFHS4,MMRate,Bihar,Patna,1-1-15,31-12-15,130
nfhs4 ,IMR,Bihar,,1.1.2015,31.12.2015,41
DLHS,IMR,Kerala,,2012-06-01,2012-06-01,12
";

const SOURCE_RULES: &str = "\
match source,match indicator,source,indicator
NFHS4,MMRate,NFHS-4,Maternal mortality
NFHS4,MMRate,NFHS-4,Maternal mortality ratio
NFHS4,IMR,NFHS-4,Infant mortality rate
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("rules")).unwrap();
        fs::write(dir.path().join("survey.csv"), SURVEY).unwrap();
        fs::write(dir.path().join("rules").join("source.csv"), SOURCE_RULES).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn transform_args(&self, transformers: &[&str]) -> TransformArgs {
        TransformArgs {
            input: self.path("survey.csv"),
            rules_dir: self.path("rules"),
            transformers: transformers.iter().map(|t| (*t).to_string()).collect(),
            output: None,
            reports_dir: Some(self.path("reports")),
        }
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn transform_writes_output_and_unmatched_report() {
    let fixture = Fixture::new();

    let result = run_transform(&fixture.transform_args(&["source", "date", "entity-type"])).unwrap();

    assert_eq!(result.input_records, 3);
    assert_eq!(result.output_records, 4);
    assert!(!result.has_errors());
    assert_eq!(result.output, fixture.path("survey.transformed.csv"));
    assert_eq!(result.stages.len(), 3);
    assert_eq!(result.stages[0].unmatched, 1);

    let output = read(&result.output);
    assert!(output.contains("Maternal mortality ratio"));
    assert!(output.contains("2015-1-1"));
    assert!(output.contains("DISTRICT"));
    assert!(output.contains("meta.original.source"));

    assert_eq!(result.reports, vec![fixture.path("reports").join("source.unmatched.csv")]);
    assert_eq!(
        read(&result.reports[0]),
        "source,indicator,occurrences\ndlhs,imr,1\n"
    );
}

#[test]
fn transform_uses_sidecar_transformers() {
    let fixture = Fixture::new();
    fs::write(
        fixture.path("survey.meta.json"),
        r#"{"fields": [], "transformers": ["date"]}"#,
    )
    .unwrap();

    let result = run_transform(&fixture.transform_args(&[])).unwrap();

    let names: Vec<&str> = result.stages.iter().map(|s| s.transformer.as_str()).collect();
    assert_eq!(names, vec!["date"]);
    assert!(result.reports.is_empty());
}

#[test]
fn transform_reports_rejected_records() {
    let fixture = Fixture::new();
    fs::write(
        fixture.path("survey.csv"),
        "entity.block,entity.village,value\nA,B,1\n",
    )
    .unwrap();

    let result = run_transform(&fixture.transform_args(&["entity-type"])).unwrap();

    assert!(result.has_errors());
    assert_eq!(result.rejected.len(), 1);
    assert_eq!(result.output_records, 0);
}

#[test]
fn transform_fails_on_missing_rule_file() {
    let fixture = Fixture::new();

    let err = run_transform(&fixture.transform_args(&["region"])).unwrap_err();

    assert!(format!("{err:#}").contains("region.csv"), "{err:#}");
}

#[test]
fn rules_command_loads_table() {
    let fixture = Fixture::new();
    run_rules(&RulesArgs {
        path: fixture.path("rules").join("source.csv"),
    })
    .unwrap();
}

fn search_args(fixture: &Fixture, filter: Option<&str>, all: bool) -> SearchArgs {
    SearchArgs {
        input: fixture.path("survey.csv"),
        filter: FilterArgs {
            filter: filter.map(str::to_string),
            filter_file: None,
        },
        all,
        explain: true,
        limit: 10,
        batch_size: 2,
    }
}

#[test]
fn search_refuses_empty_filter() {
    let fixture = Fixture::new();

    let err = run_search(&search_args(&fixture, None, false)).unwrap_err();

    assert_eq!(err.downcast_ref::<QueryError>(), Some(&QueryError::EmptyFilter));
}

#[test]
fn search_all_returns_everything() {
    let fixture = Fixture::new();
    let hits = run_search(&search_args(&fixture, None, true)).unwrap();
    assert_eq!(hits.len(), 3);
}

#[test]
fn search_with_null_sentinel() {
    let fixture = Fixture::new();
    let filter = r#"{"terms": {"entity.district": ["Patna", null]}, "ranges": {"value": {"gt": "20"}}}"#;

    let hits = run_search(&search_args(&fixture, Some(filter), false)).unwrap();

    let values: Vec<Option<&str>> = hits.iter().map(|r| r.get("value")).collect();
    assert_eq!(values, vec![Some("130"), Some("41")]);
}

#[test]
fn terms_lists_distinct_combinations() {
    let fixture = Fixture::new();

    let rows = run_terms(&TermsArgs {
        input: fixture.path("survey.csv"),
        fields: vec!["entity.state".to_string(), "indicator".to_string()],
        filter: FilterArgs::default(),
        page_size: 1,
        max_pages: 100,
        batch_size: 500,
    })
    .unwrap();

    let pairs: Vec<(Option<&str>, Option<&str>)> = rows
        .iter()
        .map(|r| (r.get("entity.state"), r.get("indicator")))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (Some("Bihar"), Some("IMR")),
            (Some("Bihar"), Some("MMRate")),
            (Some("Kerala"), Some("IMR")),
        ]
    );
}

#[test]
fn filter_file_is_read() {
    let fixture = Fixture::new();
    let path = fixture.path("filter.json");
    fs::write(&path, r#"{"terms": {"source": ["DLHS"]}}"#).unwrap();

    let filter = load_filter(&FilterArgs {
        filter: None,
        filter_file: Some(path),
    })
    .unwrap();

    assert!(!filter.is_empty());
}
