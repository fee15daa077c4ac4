use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use liquidplan::config::{CleanupConfig, Config, WorkflowConfig};
use liquidplan::driver::CommandLog;
use liquidplan::labware::WellName;
use liquidplan::protocols::plan_workflow;
use liquidplan::table::{TableLayout, TransferTable};

/// Standardization table covering `wells` wells of the first source plate
fn standardize_table(wells: usize) -> String {
    let mut text = String::from("source_slot,source_well,dest_slot,dest_well,vol_dna,vol_water\n");
    for (i, well) in WellName::first_n(wells).enumerate() {
        let dna = 2.0 + (i % 40) as f64 * 1.5;
        let water = 100.0 - dna;
        text.push_str(&format!("1,{},5,{},{:.2},{:.2}\n", well, well, dna, water));
    }
    text
}

fn standardize_workflow(wells: usize) -> WorkflowConfig {
    let mut config = Config::from_str("[standardize]\n").unwrap();
    if let Some(section) = config.standardize.as_mut() {
        section.table = Some(standardize_table(wells));
    }
    config.workflow().unwrap()
}

/// Benchmark table parsing
fn bench_table_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_parse");

    for wells in [24, 48, 96] {
        let text = standardize_table(wells);
        group.throughput(Throughput::Elements(wells as u64));
        group.bench_with_input(BenchmarkId::from_parameter(wells), &text, |b, text| {
            b.iter(|| TransferTable::parse(black_box(text), TableLayout::Standardize).unwrap());
        });
    }

    group.finish();
}

/// Benchmark planning a standardization into a command log
fn bench_standardize_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("standardize_plan");

    for wells in [24, 48, 96] {
        let workflow = standardize_workflow(wells);
        group.throughput(Throughput::Elements(wells as u64));
        group.bench_with_input(BenchmarkId::from_parameter(wells), &workflow, |b, workflow| {
            b.iter(|| {
                let mut log = CommandLog::new();
                plan_workflow(black_box(workflow), &mut log).unwrap();
                log.len()
            });
        });
    }

    group.finish();
}

/// Benchmark a full-plate bead cleanup at several wash batch sizes
fn bench_cleanup_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("cleanup_plan");

    for batch_size in [2, 3, 4, 6] {
        let workflow = WorkflowConfig::Cleanup(CleanupConfig {
            batch_size,
            ..CleanupConfig::default()
        });
        group.bench_with_input(BenchmarkId::from_parameter(batch_size), &workflow, |b, workflow| {
            b.iter(|| {
                let mut log = CommandLog::new();
                plan_workflow(black_box(workflow), &mut log).unwrap();
                log.stats()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_table_parse, bench_standardize_plan, bench_cleanup_plan);
criterion_main!(benches);
