use crate::core::dom::NodeId;
use crate::domain::ports::{ImageProbe, ImageStatus};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Probes photo sources concurrently, at most `concurrency` at a time.
#[derive(Clone)]
pub struct PhotoResolver {
    probe: Arc<dyn ImageProbe>,
    concurrency: usize,
}

impl PhotoResolver {
    pub fn new(probe: Arc<dyn ImageProbe>, concurrency: usize) -> Self {
        Self {
            probe,
            concurrency: concurrency.max(1),
        }
    }

    /// Results come back in input order.
    pub async fn resolve(&self, photos: Vec<(NodeId, String)>) -> Vec<(NodeId, ImageStatus)> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, (node, src)) in photos.iter().cloned().enumerate() {
            let probe = Arc::clone(&self.probe);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let status = match semaphore.acquire_owned().await {
                    Ok(_permit) => probe.probe(&src).await,
                    Err(e) => ImageStatus::Failed(format!("probe cancelled: {}", e)),
                };
                (index, node, status)
            });
        }

        let mut results: Vec<Option<(NodeId, ImageStatus)>> = vec![None; photos.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, node, status)) => results[index] = Some((node, status)),
                Err(e) => tracing::warn!("Photo probe task failed: {}", e),
            }
        }

        results
            .into_iter()
            .zip(photos)
            .map(|(result, (node, _))| {
                result.unwrap_or((node, ImageStatus::Failed("probe did not complete".to_string())))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dom::Dom;
    use crate::core::markup::{Element, Fragment, Node};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProbe {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ImageProbe for CountingProbe {
        async fn probe(&self, src: &str) -> ImageStatus {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if src.contains("broken") {
                ImageStatus::Failed("404".to_string())
            } else {
                ImageStatus::Loaded
            }
        }
    }

    fn nodes(count: usize) -> Vec<NodeId> {
        let mut dom = Dom::new("main");
        let root = dom.root();
        let fragment: Fragment = (0..count)
            .map(|_| Node::from(Element::new("img").attr("src", "x.jpg")))
            .collect();
        dom.append_fragment(root, &fragment)
    }

    #[tokio::test]
    async fn resolves_in_order_within_concurrency_limit() {
        let probe = Arc::new(CountingProbe {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let resolver = PhotoResolver::new(probe.clone(), 2);
        let ids = nodes(6);
        let photos: Vec<(NodeId, String)> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, if i == 3 { "broken.jpg" } else { "ok.jpg" }.to_string()))
            .collect();

        let results = resolver.resolve(photos).await;

        assert_eq!(results.len(), 6);
        assert_eq!(results[3], (ids[3], ImageStatus::Failed("404".to_string())));
        assert_eq!(results[0], (ids[0], ImageStatus::Loaded));
        assert!(probe.peak.load(Ordering::SeqCst) <= 2);
    }
}
