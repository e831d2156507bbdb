use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use datastore::{DatastoreExt, InMemoryDatastore, Key};
use domain::{Conference, Speaker, Task};
use projections::{CacheManager, InMemoryCache};

/// Populate a store with N conferences, a fifth of them nearly sold out.
async fn populate_store(store: &InMemoryDatastore, n: i64) {
    let organizer = Key::named("Profile", "bench");
    for i in 0..n {
        let seats = if i % 5 == 0 { 3 } else { 40 };
        let conference = Conference {
            name: format!("Conference {i:04}"),
            description: None,
            topics: vec!["Rust".into()],
            city: None,
            start_date: None,
            end_date: None,
            month: 0,
            max_attendees: 50,
            seats_available: seats,
            organizer_user_id: common::UserId::new("bench"),
        };
        store
            .put_entity(&organizer.child_id("Conference", i + 1), &conference)
            .await
            .unwrap();
    }
}

fn bench_announcement_1000_conferences(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryDatastore::new();
    rt.block_on(populate_store(&store, 1000));
    let manager = CacheManager::with_defaults(store, InMemoryCache::new());

    c.bench_function("projections/announcement_1000_conferences", |b| {
        b.iter(|| rt.block_on(manager.handle(&Task::set_announcement())).unwrap());
    });
}

fn bench_featured_speaker(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryDatastore::new();
    let key = Speaker::key_for("Ada Lovelace").unwrap();
    let mut speaker = Speaker::new("Ada Lovelace");
    for i in 0..20 {
        speaker.add_session(&format!("Session {i}"), &Key::with_id("Session", i + 1));
    }
    rt.block_on(store.put_entity(&key, &speaker)).unwrap();
    let manager = Arc::new(CacheManager::with_defaults(store, InMemoryCache::new()));
    let task = Task::set_featured_speaker(&key);

    c.bench_function("projections/featured_speaker", |b| {
        b.iter(|| rt.block_on(manager.handle(&task)).unwrap());
    });
}

criterion_group!(benches, bench_announcement_1000_conferences, bench_featured_speaker);
criterion_main!(benches);
