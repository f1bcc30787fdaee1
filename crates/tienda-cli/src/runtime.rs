// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;
use tienda_app::{
    Activity, ActivityId, DashboardSummary, Product, ProductId, ProductPage, ProductUpdate,
};
use tienda_db::Store;
use tienda_tui::{InternalEvent, PageOutcome};

pub struct DbRuntime<'a> {
    store: &'a Store,
    db_path: Option<PathBuf>,
}

impl<'a> DbRuntime<'a> {
    /// Runtime over a single connection; page loads run inline on the
    /// calling thread. An in-memory store cannot be reopened elsewhere, so
    /// demo mode uses this constructor.
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            db_path: None,
        }
    }

    /// Runtime whose page loads open their own connection to `db_path` on a
    /// spawned thread, so a slow read never stalls the draw loop.
    pub fn with_background_loads(store: &'a Store, db_path: PathBuf) -> Self {
        Self {
            store,
            db_path: Some(db_path),
        }
    }
}

impl tienda_tui::AppRuntime for DbRuntime<'_> {
    fn load_products_page(&mut self, offset: u64, limit: u64) -> Result<ProductPage> {
        self.store.list_products_page(offset, limit)
    }

    fn load_product(&mut self, product_id: ProductId) -> Result<Option<Product>> {
        self.store.get_product(product_id)
    }

    fn save_product(&mut self, product_id: ProductId, update: &ProductUpdate) -> Result<()> {
        self.store.update_product(product_id, update)
    }

    fn load_dashboard_summary(&mut self) -> Result<DashboardSummary> {
        self.store.dashboard_summary()
    }

    fn load_recent_activities(&mut self, limit: u64) -> Result<Vec<Activity>> {
        self.store.list_recent_activities(limit)
    }

    fn mark_activity_read(&mut self, activity_id: ActivityId) -> Result<()> {
        self.store.mark_activity_read(activity_id)
    }

    fn spawn_page_load(
        &mut self,
        request_id: u64,
        offset: u64,
        limit: u64,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let Some(path) = self.db_path.clone() else {
            let outcome = match self.store.list_products_page(offset, limit) {
                Ok(page) => PageOutcome::Loaded(page),
                Err(error) => PageOutcome::Failed(error.to_string()),
            };
            return tx
                .send(InternalEvent::PageLoaded {
                    request_id,
                    outcome,
                })
                .map_err(|_| anyhow!("page event channel closed"));
        };

        thread::spawn(move || {
            let outcome = match Store::open(&path)
                .and_then(|store| store.list_products_page(offset, limit))
            {
                Ok(page) => PageOutcome::Loaded(page),
                Err(error) => PageOutcome::Failed(error.to_string()),
            };
            // The receiver may have quit; dropping the response is fine.
            let _ = tx.send(InternalEvent::PageLoaded {
                request_id,
                outcome,
            });
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DbRuntime;
    use anyhow::Result;
    use std::sync::mpsc;
    use std::time::Duration;
    use tienda_db::Store;
    use tienda_tui::{AppRuntime, InternalEvent, PageOutcome};

    #[test]
    fn runtime_reads_pages_through_the_store() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        store.seed_demo_data()?;

        let mut runtime = DbRuntime::new(&store);
        let page = runtime.load_products_page(0, 10)?;
        assert_eq!(page.total_count, 25);
        assert_eq!(page.rows.len(), 10);

        let product = runtime.load_product(page.rows[0].id)?.expect("row exists");
        assert_eq!(product.id, page.rows[0].id);
        Ok(())
    }

    #[test]
    fn runtime_surfaces_dashboard_and_activities() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        store.seed_demo_data()?;

        let mut runtime = DbRuntime::new(&store);
        let summary = runtime.load_dashboard_summary()?;
        assert_eq!(summary.product_count, 25);

        let activities = runtime.load_recent_activities(5)?;
        assert_eq!(activities.len(), 5);
        runtime.mark_activity_read(activities[0].id)?;
        Ok(())
    }

    #[test]
    fn file_backed_page_load_runs_off_thread_and_posts_the_tagged_event() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db_path = dir.path().join("tienda.db");
        let store = Store::open(&db_path)?;
        store.bootstrap()?;
        store.seed_demo_data()?;

        let mut runtime = DbRuntime::with_background_loads(&store, db_path);
        let (tx, rx) = mpsc::channel();
        runtime.spawn_page_load(3, 0, 10, tx)?;

        let event = rx.recv_timeout(Duration::from_secs(5))?;
        let InternalEvent::PageLoaded {
            request_id,
            outcome,
        } = event
        else {
            panic!("unexpected event {event:?}");
        };
        assert_eq!(request_id, 3);
        let PageOutcome::Loaded(page) = outcome else {
            panic!("load failed: {outcome:?}");
        };
        assert_eq!(page.total_count, 25);
        assert_eq!(page.rows.len(), 10);
        Ok(())
    }

    #[test]
    fn in_memory_page_load_posts_inline() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        store.seed_demo_data()?;

        let mut runtime = DbRuntime::new(&store);
        let (tx, rx) = mpsc::channel();
        runtime.spawn_page_load(1, 0, 10, tx)?;

        // Inline loads complete before spawn_page_load returns.
        let event = rx.try_recv()?;
        assert!(matches!(
            event,
            InternalEvent::PageLoaded { request_id: 1, .. }
        ));
        Ok(())
    }
}
