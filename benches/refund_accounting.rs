use action_dispatcher::domain::{RefundPayment, Refunds};
use action_dispatcher::refunds::{recalculate, upsert_payment};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use std::time::Duration;

fn benchmark_recalculate(c: &mut Criterion) {
    let mut group = c.benchmark_group("refund_accounting");
    group.measurement_time(Duration::from_secs(5));

    for size in [10, 100, 1000].iter() {
        let mut agg = Refunds::default();
        for i in 0..*size {
            agg = upsert_payment(
                &agg,
                RefundPayment {
                    id: i.to_string(),
                    amount: Decimal::from(i % 1000 + 1),
                    fee: Decimal::from(i % 10),
                },
            );
        }

        group.bench_with_input(BenchmarkId::new("recalculate", size), size, |b, _| {
            b.iter(|| {
                let mut agg = agg.clone();
                recalculate(&mut agg, black_box(2));
                black_box(agg)
            });
        });
    }

    group.finish();
}

fn benchmark_upsert_payment(c: &mut Criterion) {
    c.bench_function("upsert_payment_append", |b| {
        let agg = Refunds::default();
        b.iter(|| {
            let updated = upsert_payment(
                black_box(&agg),
                RefundPayment {
                    id: "1".to_string(),
                    amount: Decimal::from(10),
                    fee: Decimal::from(1),
                },
            );
            black_box(updated)
        });
    });
}

criterion_group!(benches, benchmark_recalculate, benchmark_upsert_payment);
criterion_main!(benches);
