use std::time::Duration;

use async_trait::async_trait;
use criterion::{Criterion, criterion_group, criterion_main};
use pipeline::{
    CachePolicy, DispatcherBuilder, Handler, Request, RequestContext, RequestDispatcher,
    RequestKind, Result, Rules,
};

struct Lookup {
    code: String,
}

impl Request for Lookup {
    type Response = Vec<String>;
    const NAME: &'static str = "Lookup";
    const KIND: RequestKind = RequestKind::Query;

    fn cache_policy(&self) -> Option<CachePolicy> {
        Some(CachePolicy::new(
            format!("Bench_{}", self.code),
            Duration::from_secs(300),
        ))
    }
}

struct LookupHandler;

#[async_trait]
impl Handler<Lookup> for LookupHandler {
    async fn handle(&self, request: Lookup, _ctx: &RequestContext) -> Result<Vec<String>> {
        Ok((0..32).map(|i| format!("{}-{i}", request.code)).collect())
    }
}

fn dispatcher() -> RequestDispatcher {
    let mut builder = DispatcherBuilder::new();
    builder
        .handler::<Lookup, _>(LookupHandler)
        .unwrap()
        .validator::<Lookup>(Rules::new().not_blank("code", |r: &Lookup| r.code.as_str()));
    builder.build().unwrap()
}

fn bench_cache_hit(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dispatcher = dispatcher();
    let ctx = RequestContext::default();

    rt.block_on(async {
        dispatcher
            .send(Lookup { code: "EU".into() }, &ctx)
            .await
            .unwrap();
    });

    c.bench_function("pipeline/dispatch_cache_hit", |b| {
        b.iter(|| {
            rt.block_on(async {
                dispatcher
                    .send(Lookup { code: "EU".into() }, &ctx)
                    .await
                    .unwrap()
            })
        });
    });
}

fn bench_cache_miss(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dispatcher = dispatcher();
    let ctx = RequestContext::default();

    c.bench_function("pipeline/dispatch_cache_miss", |b| {
        b.iter(|| {
            rt.block_on(async {
                dispatcher.cache().remove("Bench_EU").await;
                dispatcher
                    .send(Lookup { code: "EU".into() }, &ctx)
                    .await
                    .unwrap()
            })
        });
    });
}

criterion_group!(benches, bench_cache_hit, bench_cache_miss);
criterion_main!(benches);
