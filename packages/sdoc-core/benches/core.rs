use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use sdoc_core::vocab::sdoc;
use sdoc_core::{NodeDescription, Operation, Page, Triple, UpdateClause};

const PAGE_ID: &str = "http://example.org/bench";

const CI_CONFIG: &[(u64, u64)] = &[(100, 5), (1_000, 1)];

const LOCAL_CONFIG: &[(u64, u64)] = &[(1, 1), (10, 1), (100, 1), (1_000, 1)];

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    implementation: &'static str,
    storage: &'static str,
    workload: String,
    timestamp: String,
    name: String,
    total_ops: u64,
    duration_ms: f64,
    ops_per_sec: f64,
    extra: Extra,
    source_file: Option<String>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Extra {
    count: u64,
    mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    iterations: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avg_duration_ms: Option<f64>,
}

fn is_ci() -> bool {
    env::var("CI").map(|v| v == "true").unwrap_or(false)
}

fn paragraph(i: u64) -> NodeDescription {
    NodeDescription::new(format!("{PAGE_ID}#p{i}"), sdoc::PARAGRAPH).with_children(vec![
        NodeDescription::new(format!("{PAGE_ID}#t{i}"), sdoc::LEAF)
            .with_property("text", format!("paragraph {i}")),
    ])
}

/// Append `count` paragraphs, render the patch and commit. Returns the stored triples.
fn insert_and_commit(count: u64) -> (f64, Vec<Triple>) {
    let mut page = Page::new(PAGE_ID, Default::default()).unwrap();
    let start = Instant::now();
    for i in 0..count {
        let op = Operation::InsertNode {
            path: vec![i as usize],
            node: paragraph(i),
        };
        page.apply(&op).unwrap();
    }
    let patch = page.patch_for_update().unwrap();
    let _ = patch.to_string();
    page.commit().unwrap();
    let elapsed = start.elapsed().as_secs_f64() * 1000.0;

    let triples = patch
        .iter()
        .filter_map(|clause| match clause {
            UpdateClause::InsertProperty {
                subject,
                predicate,
                object,
                ..
            } => Some(Triple::new(subject.clone(), predicate.clone(), object.to_term())),
            _ => None,
        })
        .collect();
    (elapsed, triples)
}

/// Load the stored document, type into every leaf and render the patch.
fn load_and_edit(triples: &[Triple], count: u64) -> f64 {
    let start = Instant::now();
    let mut page = Page::from_triples(PAGE_ID, triples).unwrap();
    for i in 0..count {
        let op = Operation::InsertText {
            path: vec![i as usize, 0],
            offset: 0,
            text: "edited ".into(),
        };
        page.apply(&op).unwrap();
    }
    let _ = page.sparql_for_update().unwrap();
    start.elapsed().as_secs_f64() * 1000.0
}

/// Workload sizes and output directory taken from the command line.
struct Args {
    counts: Option<Vec<(u64, u64)>>,
    out_dir: PathBuf,
}

fn parse_args() -> Args {
    let mut args = Args {
        counts: None,
        out_dir: PathBuf::from("benchmarks/core"),
    };
    for arg in env::args().skip(1) {
        if let Some(val) = arg.strip_prefix("--count=") {
            args.counts = Some(vec![(val.parse().unwrap_or(100), 1)]);
        } else if let Some(val) = arg.strip_prefix("--counts=") {
            let counts: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse::<u64>().ok())
                .map(|c| (c, 1))
                .collect();
            if !counts.is_empty() {
                args.counts = Some(counts);
            }
        } else if let Some(val) = arg.strip_prefix("--out-dir=") {
            args.out_dir = PathBuf::from(val);
        }
    }
    args
}

fn main() {
    let args = parse_args();
    let default_config: &[(u64, u64)] = if is_ci() { CI_CONFIG } else { LOCAL_CONFIG };
    let config = args.counts.as_deref().unwrap_or(default_config);
    let out_dir = args.out_dir;
    fs::create_dir_all(&out_dir).expect("create benchmark output directory");

    for &(count, iterations) in config {
        let mut inserts = Vec::new();
        let mut edits = Vec::new();
        for _ in 0..iterations.max(1) {
            let (insert_ms, stored) = insert_and_commit(count);
            inserts.push(insert_ms);
            edits.push(load_and_edit(&stored, count));
        }

        for (workload, durations) in [("insert-commit", inserts), ("load-edit", edits)] {
            let avg = durations.iter().sum::<f64>() / durations.len() as f64;
            let (iterations_opt, avg_duration_ms) = if iterations > 1 {
                (Some(iterations), Some(avg))
            } else {
                (None, None)
            };

            let workload_name = format!("{workload}-{count}");
            let out_path = out_dir.join(format!("memory-{workload_name}.json"));
            let output = Output {
                implementation: "sdoc-core",
                storage: "memory",
                workload: workload_name.clone(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                name: workload_name,
                total_ops: count,
                duration_ms: avg,
                ops_per_sec: if avg > 0.0 {
                    count as f64 / avg * 1000.0
                } else {
                    f64::INFINITY
                },
                extra: Extra {
                    count,
                    mode: "sequential",
                    iterations: iterations_opt,
                    avg_duration_ms,
                },
                source_file: Some(out_path.display().to_string()),
            };

            let json = serde_json::to_string_pretty(&output).expect("benchmark result serializes");
            fs::write(&out_path, &json).expect("write benchmark result");
            println!("{json}");
        }
    }
}
