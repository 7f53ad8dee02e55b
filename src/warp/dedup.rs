use std::sync::Mutex;

/// "Fire at most once per distinct key."
///
/// Remembers the last key it delivered. A value whose key equals that key is
/// suppressed, however it was constructed. An empty observation neither
/// delivers nor forgets the last key, so `A -> empty -> A` fires once.
#[derive(Debug, Clone)]
pub struct OncePerKey<K> {
    last_delivered: Option<K>,
}

impl<K: PartialEq> OncePerKey<K> {
    pub fn new() -> Self {
        Self {
            last_delivered: None,
        }
    }

    /// Record an observation. Returns true when the caller should deliver.
    pub fn admit(&mut self, key: Option<K>) -> bool {
        let Some(key) = key else {
            return false;
        };
        if self.last_delivered.as_ref() == Some(&key) {
            return false;
        }
        self.last_delivered = Some(key);
        true
    }

    /// Project `value` to its key and run `callback` if it is a new key.
    pub fn observe<T, F, C>(&mut self, value: Option<&T>, key_fn: F, callback: C) -> bool
    where
        T: ?Sized,
        F: FnOnce(&T) -> K,
        C: FnOnce(&T),
    {
        let Some(value) = value else {
            return false;
        };
        if !self.admit(Some(key_fn(value))) {
            return false;
        }
        callback(value);
        true
    }

    pub fn last_delivered(&self) -> Option<&K> {
        self.last_delivered.as_ref()
    }
}

impl<K: PartialEq> Default for OncePerKey<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`OncePerKey`] bundled with its key projection and callback, shareable
/// across threads so it can sit behind a bus listener.
pub struct DedupWatcher<T, K> {
    policy: Mutex<OncePerKey<K>>,
    key_fn: Box<dyn Fn(&T) -> K + Send + Sync>,
    callback: Box<dyn Fn(&T) + Send + Sync>,
}

impl<T, K: PartialEq> DedupWatcher<T, K> {
    pub fn new<F, C>(key_fn: F, callback: C) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
        C: Fn(&T) + Send + Sync + 'static,
    {
        Self {
            policy: Mutex::new(OncePerKey::new()),
            key_fn: Box::new(key_fn),
            callback: Box::new(callback),
        }
    }

    /// The callback runs after the policy lock is released, so it may feed
    /// new observations back into this watcher.
    pub fn observe(&self, value: Option<&T>) -> bool {
        let Some(value) = value else {
            return false;
        };
        let key = (self.key_fn)(value);
        let admitted = self
            .policy
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .admit(Some(key));
        if admitted {
            (self.callback)(value);
        }
        admitted
    }
}
