use criterion::{criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;
use tour_core::{AllocationPolicy, ForecastInput};

fn bench_compute(c: &mut Criterion) {
    // Roughly three years of weekly rows.
    let input = ForecastInput {
        show_date: chrono::NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
        announce_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        avg_ticket_price: Decimal::new(4_750, 2),
        marketing_budget: Decimal::new(25_000, 0),
        other_costs: Decimal::new(12_500, 0),
        target_capacity: 20_000,
    };
    c.bench_function("forecast_integer", |b| {
        b.iter(|| {
            let _ = tour_forecast::compute(&input, AllocationPolicy::IntegerRemainderAbsorbed);
        })
    });
    c.bench_function("forecast_continuous", |b| {
        b.iter(|| {
            let _ = tour_forecast::compute(&input, AllocationPolicy::Continuous);
        })
    });
}

criterion_group!(benches, bench_compute);
criterion_main!(benches);
