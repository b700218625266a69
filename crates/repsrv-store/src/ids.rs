use std::sync::atomic::{AtomicU64, Ordering};

use repsrv_types::Iri;

/// Mints identifiers for newly created resources.
///
/// Identifiers have the form `{scheme}://{authority}{new_path}/{n}` where `n`
/// starts at 1 and strictly increases. The counter is never rewound, so an
/// identifier is never handed out twice for the lifetime of the generator.
#[derive(Debug)]
pub struct IdGenerator {
    /// Origin with the base path already applied (no trailing slash).
    base: Iri,
    next: AtomicU64,
}

impl IdGenerator {
    /// Create a generator rooted at `origin` (scheme and authority are taken
    /// from it) under `new_path`. A trailing slash on `new_path` is ignored.
    pub fn new(origin: &Iri, new_path: &str) -> Self {
        let trimmed = new_path.trim_end_matches('/');
        let base_path = if trimmed.is_empty() || trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        Self {
            base: origin.with_path(&base_path),
            next: AtomicU64::new(1),
        }
    }

    /// Return a previously unused identifier.
    pub fn next(&self) -> Iri {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        self.base.with_path(&format!("{}/{n}", self.base_path()))
    }

    /// The path prefix shared by every minted identifier.
    pub fn base_path(&self) -> &str {
        self.base.path().trim_end_matches('/')
    }

    /// Recover the counter value embedded in an identifier this generator minted.
    pub fn sequence_of(&self, id: &Iri) -> Option<u64> {
        if id.scheme() != self.base.scheme() || id.authority() != self.base.authority() {
            return None;
        }
        id.path()
            .strip_prefix(self.base_path())?
            .strip_prefix('/')?
            .parse()
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn origin() -> Iri {
        Iri::parse("https://h").unwrap()
    }

    #[test]
    fn first_id_is_one() {
        let ids = IdGenerator::new(&origin(), "/new");
        assert_eq!(ids.next().as_str(), "https://h/new/1");
        assert_eq!(ids.next().as_str(), "https://h/new/2");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let ids = IdGenerator::new(&origin(), "/new/");
        assert_eq!(ids.next().as_str(), "https://h/new/1");
    }

    #[test]
    fn missing_leading_slash_is_added() {
        let ids = IdGenerator::new(&origin(), "objects");
        assert_eq!(ids.next().as_str(), "https://h/objects/1");
    }

    #[test]
    fn root_path_mints_top_level_ids() {
        let ids = IdGenerator::new(&origin(), "/");
        assert_eq!(ids.next().as_str(), "https://h/1");
    }

    #[test]
    fn port_is_preserved() {
        let ids = IdGenerator::new(&Iri::parse("http://localhost:8080").unwrap(), "/new");
        assert_eq!(ids.next().as_str(), "http://localhost:8080/new/1");
    }

    #[test]
    fn sequence_roundtrips() {
        let ids = IdGenerator::new(&origin(), "/new");
        let a = ids.next();
        let b = ids.next();
        assert_eq!(ids.sequence_of(&a), Some(1));
        assert_eq!(ids.sequence_of(&b), Some(2));
        assert_eq!(ids.sequence_of(&Iri::parse("https://other/new/1").unwrap()), None);
        assert_eq!(ids.sequence_of(&Iri::parse("https://h/actor").unwrap()), None);
    }

    #[test]
    fn concurrent_ids_are_unique_and_ordered_per_thread() {
        let ids = Arc::new(IdGenerator::new(&origin(), "/new"));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || (0..200).map(|_| ids.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            let minted = handle.join().expect("thread should not panic");
            let seqs: Vec<u64> = minted.iter().filter_map(|id| ids.sequence_of(id)).collect();
            assert_eq!(seqs.len(), minted.len());
            assert!(seqs.windows(2).all(|w| w[0] < w[1]));
            all.extend(minted);
        }
        assert_eq!(all.len(), 8 * 200);
    }

    proptest::proptest! {
        #[test]
        fn n_calls_yield_n_distinct(n in 1usize..300) {
            let ids = IdGenerator::new(&origin(), "/new");
            let minted: HashSet<Iri> = (0..n).map(|_| ids.next()).collect();
            proptest::prop_assert_eq!(minted.len(), n);
        }
    }
}
