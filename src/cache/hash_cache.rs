use crate::asset::AssetId;

/// Memo table for one hashing pass.
///
/// Holds the finalized hash of every asset computed so far. An asset whose
/// hash was finalized while some cycle it depends on was still open is
/// *pending* on the stack position of that cycle's start, and is listed in
/// the start's back-propagation obligations until the start is finalized.
/// A fresh cache is created for every run, so nothing leaks between runs.
#[derive(Debug, Clone, Default)]
pub struct HashCache {
    hashes: Vec<Option<String>>,
    pending: Vec<Option<usize>>,
    backpropagate: Vec<Vec<AssetId>>,
}

impl HashCache {
    /// Create an empty cache sized for `len` assets
    pub fn new(len: usize) -> Self {
        Self {
            hashes: vec![None; len],
            pending: vec![None; len],
            backpropagate: vec![Vec::new(); len],
        }
    }

    pub fn get(&self, id: AssetId) -> Option<&str> {
        self.hashes[id.index()].as_deref()
    }

    pub fn set(&mut self, id: AssetId, hash: String) {
        self.hashes[id.index()] = Some(hash);
    }

    /// Stack position of the open cycle start `id` still has to absorb.
    pub fn pending(&self, id: AssetId) -> Option<usize> {
        self.pending[id.index()]
    }

    /// Record that `members` must absorb the final hash of `start`, which sits
    /// at stack position `depth`.
    pub fn add_obligation(&mut self, start: AssetId, depth: usize, members: impl IntoIterator<Item = AssetId>) {
        for member in members {
            self.pending[member.index()] = Some(depth);
            let list = &mut self.backpropagate[start.index()];
            if !list.contains(&member) {
                list.push(member);
            }
        }
    }

    /// Remove and return the obligations of `start`; the members stop pending.
    pub fn take_obligations(&mut self, start: AssetId) -> Vec<AssetId> {
        let members = std::mem::take(&mut self.backpropagate[start.index()]);
        for member in &members {
            self.pending[member.index()] = None;
        }
        members
    }

    pub fn into_hashes(self) -> Vec<Option<String>> {
        self.hashes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut cache = HashCache::new(2);
        cache.set(AssetId(0), "abc".to_string());
        assert_eq!(cache.get(AssetId(0)), Some("abc"));
        assert!(cache.get(AssetId(1)).is_none());
    }

    #[test]
    fn test_obligations_deduplicated_and_taken_once() {
        let mut cache = HashCache::new(3);
        cache.add_obligation(AssetId(0), 0, [AssetId(1), AssetId(2)]);
        cache.add_obligation(AssetId(0), 0, [AssetId(2)]);
        assert_eq!(cache.pending(AssetId(2)), Some(0));

        assert_eq!(cache.take_obligations(AssetId(0)), vec![AssetId(1), AssetId(2)]);
        assert!(cache.take_obligations(AssetId(0)).is_empty());
        assert_eq!(cache.pending(AssetId(1)), None);
    }
}
