//! Extensions
//!
//! An extension is a contract header (point name and applicability filter)
//! plus a payload. The header is fixed when the extension is built and has
//! no setters; plugins choose only the payload. Payload kinds form a closed
//! set, one variant per extension point kind.

use crate::{ApplicabilityFilter, CheckerSet, MetaAnnotationMode, Mode, Session};
use sema_core::{AnnotationFqn, ExtensionPointName, SessionId};
use std::collections::{HashMap, HashSet};

/// Contract record shared by every extension of a point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionHeader {
    name: ExtensionPointName,
    filter: ApplicabilityFilter,
}

impl ExtensionHeader {
    pub fn new(name: ExtensionPointName, filter: ApplicabilityFilter) -> Self {
        Self { name, filter }
    }

    pub fn name(&self) -> &ExtensionPointName {
        &self.name
    }

    pub fn filter(&self) -> &ApplicabilityFilter {
        &self.filter
    }
}

#[derive(Debug, Clone)]
pub enum ExtensionPayload {
    AdditionalCheckers(CheckerSet),
}

impl ExtensionPayload {
    /// Point this payload kind belongs to
    pub fn point(&self) -> ExtensionPointName {
        match self {
            ExtensionPayload::AdditionalCheckers(_) => ExtensionPointName::ADDITIONAL_CHECKERS,
        }
    }
}

/// A plugin contribution bound to one session
#[derive(Debug)]
pub struct Extension {
    header: ExtensionHeader,
    session: SessionId,
    payload: ExtensionPayload,
}

impl Extension {
    /// Additional checkers that run on every node
    pub fn additional_checkers(session: &Session, checkers: CheckerSet) -> Self {
        Self::additional_checkers_filtered(session, ApplicabilityFilter::all(), checkers)
    }

    /// Additional checkers restricted to the nodes `filter` accepts
    pub fn additional_checkers_filtered(session: &Session, filter: ApplicabilityFilter, checkers: CheckerSet) -> Self {
        Self {
            header: ExtensionHeader::new(ExtensionPointName::ADDITIONAL_CHECKERS, filter),
            session: session.id(),
            payload: ExtensionPayload::AdditionalCheckers(checkers),
        }
    }

    pub fn header(&self) -> &ExtensionHeader {
        &self.header
    }

    pub fn name(&self) -> &ExtensionPointName {
        self.header.name()
    }

    pub fn filter(&self) -> &ApplicabilityFilter {
        self.header.filter()
    }

    pub fn mode(&self) -> Mode {
        self.header.filter().mode()
    }

    pub fn directly_applicable_annotations(&self) -> &HashSet<AnnotationFqn> {
        self.header.filter().directly_applicable_annotations()
    }

    pub fn children_applicable_annotations(&self) -> &HashSet<AnnotationFqn> {
        self.header.filter().children_applicable_annotations()
    }

    pub fn meta_annotations(&self) -> &HashMap<AnnotationFqn, MetaAnnotationMode> {
        self.header.filter().meta_annotations()
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn payload(&self) -> &ExtensionPayload {
        &self.payload
    }

    pub fn checkers(&self) -> &CheckerSet {
        match &self.payload {
            ExtensionPayload::AdditionalCheckers(checkers) => checkers,
        }
    }
}
