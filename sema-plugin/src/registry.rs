//! Extension Registry
//!
//! `ExtensionRegistrar` is the process-wide set of factories, built once at
//! startup and shared read-only. `ExtensionService` is the per-session view:
//! it instantiates each factory once against its session, folds the payloads
//! and caches the result.
//!
//! Each extension point moves from open to closed the first time its
//! composite is read. Registering into a closed point is an error.

use crate::{CompositeCheckerSet, Extension, ExtensionFactory, Session};
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use sema_core::{ExtensionError, ExtensionPointName};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Process-wide registration set
#[derive(Default)]
pub struct ExtensionRegistrar {
    factories: HashMap<ExtensionPointName, Vec<Arc<dyn ExtensionFactory>>>,
    order: Vec<ExtensionPointName>,
}

impl std::fmt::Debug for ExtensionRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRegistrar")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl ExtensionRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_factory<F: ExtensionFactory + 'static>(self, point: ExtensionPointName, factory: F) -> Self {
        self.with_shared_factory(point, Arc::new(factory))
    }

    pub fn with_shared_factory(mut self, point: ExtensionPointName, factory: Arc<dyn ExtensionFactory>) -> Self {
        if !self.factories.contains_key(&point) {
            self.order.push(point.clone());
        }
        self.factories.entry(point).or_default().push(factory);
        self
    }

    pub fn with_additional_checkers<F: ExtensionFactory + 'static>(self, factory: F) -> Self {
        self.with_factory(ExtensionPointName::ADDITIONAL_CHECKERS, factory)
    }

    /// Points with at least one factory, in first-registration order
    pub fn point_names(&self) -> &[ExtensionPointName] {
        &self.order
    }

    pub fn factories(&self, point: &ExtensionPointName) -> &[Arc<dyn ExtensionFactory>] {
        self.factories.get(point).map(|f| f.as_slice()).unwrap_or(&[])
    }

    pub fn factory_names(&self, point: &ExtensionPointName) -> Vec<&'static str> {
        self.factories(point).iter().map(|f| f.meta().name).collect()
    }
}

struct Registrations {
    factories: Vec<Arc<dyn ExtensionFactory>>,
    closed: bool,
}

struct PointSlot {
    name: ExtensionPointName,
    registrations: Mutex<Registrations>,
    composite: OnceCell<Arc<CompositeCheckerSet>>,
}

impl PointSlot {
    fn new(name: ExtensionPointName) -> Self {
        Self {
            name,
            registrations: Mutex::new(Registrations { factories: Vec::new(), closed: false }),
            composite: OnceCell::new(),
        }
    }
}

/// Per-session extension registry and composition engine
pub struct ExtensionService {
    session: Arc<Session>,
    slots: RwLock<HashMap<ExtensionPointName, Arc<PointSlot>>>,
}

impl ExtensionService {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session, slots: RwLock::new(HashMap::new()) }
    }

    /// Fresh service seeded with every factory of `registrar`
    pub fn for_session(session: Arc<Session>, registrar: &ExtensionRegistrar) -> Self {
        let service = Self::new(session);
        for point in registrar.point_names() {
            let slot = service.slot(point);
            let mut registrations = slot.registrations.lock();
            registrations.factories.extend(registrar.factories(point).iter().cloned());
        }
        debug!(session = %service.session.id(), points = registrar.point_names().len(), "extension service seeded");
        service
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn slot(&self, point: &ExtensionPointName) -> Arc<PointSlot> {
        if let Some(slot) = self.slots.read().get(point) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write();
        Arc::clone(slots.entry(point.clone()).or_insert_with(|| Arc::new(PointSlot::new(point.clone()))))
    }

    pub fn register<F: ExtensionFactory + 'static>(&self, point: ExtensionPointName, factory: F) -> Result<(), ExtensionError> {
        self.register_shared(point, Arc::new(factory))
    }

    pub fn register_shared(&self, point: ExtensionPointName, factory: Arc<dyn ExtensionFactory>) -> Result<(), ExtensionError> {
        let slot = self.slot(&point);
        let mut registrations = slot.registrations.lock();
        if registrations.closed {
            error!(
                session = %self.session.id(),
                point = %point,
                factory = factory.meta().name,
                "registration after extension point was read"
            );
            return Err(ExtensionError::RegistrationClosed { point });
        }
        debug!(session = %self.session.id(), point = %point, factory = factory.meta().name, "factory registered");
        registrations.factories.push(factory);
        Ok(())
    }

    /// Composite for `point`, computed on first call and cached
    ///
    /// A point nobody registered into yields an empty composite. Concurrent
    /// first calls wait for a single computation.
    pub fn get(&self, point: &ExtensionPointName) -> Result<Arc<CompositeCheckerSet>, ExtensionError> {
        let slot = self.slot(point);
        slot.composite
            .get_or_try_init(|| self.compose(&slot))
            .map(Arc::clone)
            .map_err(|err| {
                error!(session = %self.session.id(), point = %point, code = err.code(), "composition failed: {}", err);
                err
            })
    }

    pub fn additional_checkers(&self) -> Result<Arc<CompositeCheckerSet>, ExtensionError> {
        self.get(&ExtensionPointName::ADDITIONAL_CHECKERS)
    }

    /// Instantiated extensions of `point`, in registration order
    pub fn extensions(&self, point: &ExtensionPointName) -> Result<Vec<Arc<Extension>>, ExtensionError> {
        Ok(self.get(point)?.extensions().to_vec())
    }

    pub fn registered_count(&self, point: &ExtensionPointName) -> usize {
        match self.slots.read().get(point) {
            Some(slot) => slot.registrations.lock().factories.len(),
            None => 0,
        }
    }

    pub fn has_extensions(&self, point: &ExtensionPointName) -> bool {
        self.registered_count(point) > 0
    }

    pub fn is_closed(&self, point: &ExtensionPointName) -> bool {
        match self.slots.read().get(point) {
            Some(slot) => slot.registrations.lock().closed,
            None => false,
        }
    }

    // Holds the registration lock for the whole fold so that no factory can
    // slip in between instantiation and closing.
    fn compose(&self, slot: &PointSlot) -> Result<Arc<CompositeCheckerSet>, ExtensionError> {
        let mut registrations = slot.registrations.lock();
        let mut extensions = Vec::with_capacity(registrations.factories.len());

        for factory in &registrations.factories {
            let meta = factory.meta();
            debug!(session = %self.session.id(), point = %slot.name, factory = meta.name, "instantiating extension");
            let extension = factory.create(&self.session).map_err(|source| ExtensionError::FactoryFailed {
                point: slot.name.clone(),
                factory: meta.name.to_string(),
                source: Box::new(source),
            })?;
            self.validate(&slot.name, meta.name, &extension)?;
            extensions.push(Arc::new(extension));
        }

        let composite = CompositeCheckerSet::compose(slot.name.clone(), extensions);
        registrations.closed = true;
        info!(
            session = %self.session.id(),
            point = %slot.name,
            extensions = composite.extensions().len(),
            declaration_checkers = composite.declarations().len(),
            expression_checkers = composite.expressions().len(),
            "extension point composed"
        );
        Ok(Arc::new(composite))
    }

    fn validate(&self, point: &ExtensionPointName, factory: &str, extension: &Extension) -> Result<(), ExtensionError> {
        if extension.name() != point {
            return Err(ExtensionError::PointMismatch {
                factory: factory.to_string(),
                expected: point.clone(),
                actual: extension.name().clone(),
            });
        }
        if extension.session_id() != self.session.id() {
            return Err(ExtensionError::ForeignSession {
                factory: factory.to_string(),
                expected: self.session.id(),
                actual: extension.session_id(),
            });
        }
        Ok(())
    }
}
