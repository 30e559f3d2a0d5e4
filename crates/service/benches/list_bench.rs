use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use configs::QueryConfig;
use models::user::Role;
use service::access::Requester;
use service::query::ListParams;
use service::service_provider::repo::InMemoryServiceProviderRepository;
use service::service_provider::{CreateServiceProviderInput, ServiceProviderService};

fn bench_translate(c: &mut Criterion) {
    let cfg = QueryConfig::default();
    let pairs = [
        ("rating[gte]", "3.5"),
        ("status[in]", "active,inactive"),
        ("category", "plumbing"),
        ("select", "name,rating,status"),
        ("sort", "-rating,name"),
        ("page", "3"),
        ("limit", "20"),
    ];
    c.bench_function("query_translate_resolve", |b| {
        b.iter(|| ListParams::from_pairs(pairs, &cfg).resolve().unwrap());
    });
}

fn bench_list(c: &mut Criterion) {
    let repo = Arc::new(InMemoryServiceProviderRepository::new());
    let svc = ServiceProviderService::new(repo, QueryConfig::default());
    let owner = Requester::new(uuid::Uuid::new_v4(), Role::Provider);

    // seed outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    for i in 0..2_000 {
        let input = CreateServiceProviderInput {
            name: format!("provider-{i}"),
            category: Some(["plumbing", "electric", "garden"][i % 3].into()),
            rating: Some((i % 51) as f64 / 10.0),
            ..Default::default()
        };
        rt.block_on(svc.create(owner, input)).unwrap();
    }

    let query: Vec<(String, String)> = [("rating[gte]", "2.5"), ("category", "garden"), ("page", "2")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    c.bench_function("memory_list_filtered_page", |b| {
        b.iter(|| rt.block_on(svc.list(&query)).unwrap());
    });
}

criterion_group!(benches, bench_translate, bench_list);
criterion_main!(benches);
