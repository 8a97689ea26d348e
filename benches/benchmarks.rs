use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rusty_credit::{
    aggregate::SupplementaryAggregates,
    applicant::{ApplicantRecord, ApplicantTable},
    history::{BureauRecord, InstallmentRecord, PreviousApplicationRecord},
    params::ParameterStore,
    pipeline::{engineer_features, FitMode},
};

fn applicants(n: i64) -> ApplicantTable {
    let rows = (0..n)
        .map(|id| ApplicantRecord {
            days_birth: Some(-8_000.0 - (id % 15_000) as f64),
            days_employed: if id % 7 == 0 {
                Some(365_243.0)
            } else {
                Some(-(id % 5_000) as f64)
            },
            ext_source_1: (id % 3 != 0).then(|| (id % 100) as f64 / 100.0),
            ext_source_2: Some((id % 90) as f64 / 90.0),
            ext_source_3: (id % 5 != 0).then(|| (id % 80) as f64 / 80.0),
            amt_income_total: Some(50_000.0 + (id % 1_000) as f64 * 100.0),
            amt_credit: Some(200_000.0 + (id % 500) as f64 * 1_000.0),
            amt_annuity: Some(10_000.0 + (id % 200) as f64 * 50.0),
            amt_goods_price: (id % 11 != 0).then(|| 180_000.0 + (id % 400) as f64 * 900.0),
            ..ApplicantRecord::new(id)
        })
        .collect();
    ApplicantTable::new(rows).unwrap()
}

fn history(n: i64) -> (Vec<BureauRecord>, Vec<PreviousApplicationRecord>, Vec<InstallmentRecord>) {
    let bureau = (0..n * 3)
        .map(|i| {
            let status = if i % 2 == 0 { "Active" } else { "Closed" };
            BureauRecord::new(i % n, status).with_amounts(Some(0.0), Some(500.0), Some(2_000.0))
        })
        .collect();
    let previous = (0..n * 2)
        .map(|i| {
            let status = if i % 3 == 0 { "Refused" } else { "Approved" };
            PreviousApplicationRecord::new(i % n, Some(status))
        })
        .collect();
    let installments = (0..n * 5)
        .map(|i| InstallmentRecord::new(i % n, Some(-30.0), Some(-30.0 + (i % 7) as f64 - 3.0)))
        .collect();
    (bureau, previous, installments)
}

fn benchmark_aggregation(c: &mut Criterion) {
    let (bureau, previous, installments) = history(10_000);

    c.bench_function("aggregate_10000_parallel", |b| {
        b.iter(|| {
            SupplementaryAggregates::build(
                black_box(&bureau),
                black_box(&previous),
                black_box(&installments),
                true,
            )
        });
    });

    c.bench_function("aggregate_10000_sequential", |b| {
        b.iter(|| {
            SupplementaryAggregates::build(
                black_box(&bureau),
                black_box(&previous),
                black_box(&installments),
                false,
            )
        });
    });
}

fn benchmark_engineer_features(c: &mut Criterion) {
    let (bureau, previous, installments) = history(10_000);
    let aggregates = SupplementaryAggregates::build(&bureau, &previous, &installments, true);
    let table = applicants(10_000);

    c.bench_function("engineer_features_fit_10000", |b| {
        b.iter(|| {
            let store = ParameterStore::new();
            engineer_features(black_box(table.clone()), &aggregates, &store, FitMode::Fit)
        });
    });

    let store = ParameterStore::new();
    engineer_features(table.clone(), &aggregates, &store, FitMode::Fit).expect("fit");
    c.bench_function("engineer_features_apply_10000", |b| {
        b.iter(|| engineer_features(black_box(table.clone()), &aggregates, &store, FitMode::Apply));
    });
}

criterion_group!(benches, benchmark_aggregation, benchmark_engineer_features);
criterion_main!(benches);
