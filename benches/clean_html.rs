// benches/clean_html.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use esrb_scrape::core::clean_html;

fn sample_description() -> String {
    let mut html = String::new();
    for i in 0..50 {
        html.push_str(&format!(
            "<h2 class=\"bb_tag\">Chapter {i}</h2><p>Explore <b>vast</b> worlds and \
             <a href=\"https://store.steampowered.com/app/{i}\">buy the DLC</a> today.<br>\
             <ul class=\"bb_ul\"><li>Swords &amp; sorcery</li><li>Co-op</li></ul></p>"
        ));
    }
    html
}

fn bench_clean(c: &mut Criterion) {
    let doc = sample_description();
    let plain = clean_html(&doc);

    c.bench_function("clean_html_markup", |b| {
        b.iter(|| black_box(clean_html(black_box(&doc))).len())
    });

    c.bench_function("clean_html_plain", |b| {
        b.iter(|| black_box(clean_html(black_box(&plain))).len())
    });
}

criterion_group!(benches, bench_clean);
criterion_main!(benches);
