use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cart_engine::{CartService, MemoryCartStore, MemoryCatalog, Product};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn catalog_with(products: usize) -> Arc<MemoryCatalog> {
  Arc::new(MemoryCatalog::with_products((0..products).map(|i| Product {
    id: format!("prod-{}", i),
    name: format!("Product {}", i),
    slug: format!("product-{}", i),
    price: Decimal::from(100),
    thumbnail: None,
    category: None,
  })))
}

fn fresh_service(products: usize) -> CartService {
  CartService::new(Arc::new(MemoryCartStore::new()), catalog_with(products))
}

// Repeated adds of one product: the merge path plus a populated re-read.
fn bench_merge_same_product(c: &mut Criterion) {
  let rt = Runtime::new().unwrap();
  let service = fresh_service(1);

  c.bench_function("add_item_merge_same_product", |b| {
    b.to_async(&rt).iter(|| async {
      service
        .add_item("bench", "prod-0", 1, Decimal::from(100))
        .await
        .unwrap()
    })
  });
}

// Cost of returning the populated cart as the number of lines grows.
fn bench_get_cart_by_line_count(c: &mut Criterion) {
  let mut group = c.benchmark_group("GetCartByLineCount");
  let rt = Runtime::new().unwrap();

  for lines in [1usize, 10, 50].iter() {
    let service = fresh_service(*lines);
    rt.block_on(async {
      for i in 0..*lines {
        service
          .add_item("bench", &format!("prod-{}", i), 1, Decimal::from(100))
          .await
          .unwrap();
      }
    });

    group.throughput(Throughput::Elements(*lines as u64));
    group.bench_with_input(BenchmarkId::from_parameter(lines), lines, |b, _| {
      b.to_async(&rt).iter(|| async { service.get_cart("bench").await.unwrap() })
    });
  }
  group.finish();
}

criterion_group!(benches, bench_merge_same_product, bench_get_cart_by_line_count);
criterion_main!(benches);
