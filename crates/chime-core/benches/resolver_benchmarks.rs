use chime_core::models::{Event, RepeatInterval, DAY_SECS};
use chime_core::reminder::{NextReminderResolver, ReminderConfig};
use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn create_test_event(repeat_interval: RepeatInterval) -> Event {
    Event {
        id: 1,
        title: "Benchmark Event".to_string(),
        start_ts: Utc.with_ymd_and_hms(2000, 1, 31, 9, 0, 0).unwrap().timestamp(),
        repeat_interval,
        reminders: vec![5, 15, 60, 1440],
        ..Default::default()
    }
}

fn now() -> i64 {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap().timestamp()
}

fn bench_resolve_daily_far_anchor(c: &mut Criterion) {
    let resolver = NextReminderResolver::with_defaults();
    let event = create_test_event(RepeatInterval::Day);

    c.bench_function("resolve_daily_25_years_behind", |b| {
        b.iter(|| resolver.resolve_at(black_box(&event), black_box(now())))
    });
}

fn bench_resolve_daily_with_exclusions(c: &mut Criterion) {
    let resolver = NextReminderResolver::with_defaults();
    let mut event = create_test_event(RepeatInterval::Day);
    event.start_ts = now() - 30 * DAY_SECS;
    for day in 30..60 {
        event.ignored_occurrences.insert(event.start_ts + day * DAY_SECS);
    }

    c.bench_function("resolve_daily_30_skipped", |b| {
        b.iter(|| resolver.resolve_at(black_box(&event), black_box(now())))
    });
}

fn bench_resolve_monthly(c: &mut Criterion) {
    let resolver = NextReminderResolver::new(ReminderConfig {
        timezone: "Europe/Berlin".parse().unwrap(),
        ..Default::default()
    });
    let event = create_test_event(RepeatInterval::Month);

    c.bench_function("resolve_monthly_in_zone", |b| {
        b.iter(|| resolver.resolve_at(black_box(&event), black_box(now())))
    });
}

criterion_group!(
    benches,
    bench_resolve_daily_far_anchor,
    bench_resolve_daily_with_exclusions,
    bench_resolve_monthly
);
criterion_main!(benches);
