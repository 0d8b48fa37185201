use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use when_engine::{locales::sv, Parser, ReferenceInstant};

const PARAGRAPH: &str = "Mötet flyttas från tisdag den 10 januari kl 13 till fredag. \
    Vi ses imorgon kväll eller på lördag, senast 31 mars 2016. \
    Rapporten skickades för 3 dagar sedan och nästa version kommer om 2 veckor. \
    Semestern är 10 - 22 augusti 2012, samlingen klockan 8:30 på morgonen.";

fn bench_parse(c: &mut Criterion) {
    let reference = ReferenceInstant::utc(Utc.with_ymd_and_hms(2012, 8, 10, 12, 0, 0).unwrap());
    let parser = Parser::new(sv::casual().unwrap());

    c.bench_function("sv_parse_paragraph", |b| {
        b.iter(|| parser.parse(black_box(PARAGRAPH), &reference))
    });

    c.bench_function("sv_parse_first_short", |b| {
        b.iter(|| parser.parse_first(black_box("10 augusti 2012, 14:30"), &reference))
    });

    c.bench_function("sv_locale_build", |b| b.iter(|| sv::casual().unwrap()));
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
