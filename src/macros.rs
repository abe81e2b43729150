/// Helper macro for reading locked items
///
/// Poisoned locks are surfaced as [`crate::Error::LockError`], so this may only be used
/// inside functions returning [`crate::Result`].
///
/// ```rust, ignore
///  let data = read_lock!(my_arc_rwlock);
///  println!("{}", data.some_field);
/// ```
macro_rules! read_lock {
    ($arc_rwlock:expr) => {
        $arc_rwlock.read().map_err(|_| crate::Error::LockError)?
    };
}

/// Helper macro for reading locked items in infallible lookup paths
///
/// A poisoned lock still holds consistent table data (writers never leave a table half
/// updated), so lookups recover the guard instead of failing.
///
/// ```rust, ignore
///  let name = with_read!(raw_tables, |tables| tables.len());
/// ```
macro_rules! with_read {
    ($arc_rwlock:expr, $closure:expr) => {{
        let guard = $arc_rwlock
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        $closure(&*guard)
    }};
}

/// Helper macro for writing to locked items in infallible update paths
///
/// ```rust, ignore
///  with_write!(raw_tables, |tables| tables.clear());
/// ```
macro_rules! with_write {
    ($arc_rwlock:expr, $closure:expr) => {{
        let mut guard = $arc_rwlock
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        $closure(&mut *guard)
    }};
}

/// Helper macro for locking items in infallible paths, recovering poisoned guards
///
/// ```rust, ignore
///  let _guard = lock_recover!(self.fetch_lock);
/// ```
macro_rules! lock_recover {
    ($lock:expr) => {
        $lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    };
}
