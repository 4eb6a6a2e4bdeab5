//! Map instance lifecycle
//!
//! A [`MapSession`] is the single owner of a live widget handle. Dropping it
//! (or calling [`MapSession::release`]) destroys the instance, so every exit
//! path releases the widget. [`MapInitializer`] decides when a session must be
//! replaced: only when the container or the credential changes.

use crate::{
    core::config::{FogConfig, MapViewConfig},
    storage::Credential,
    widget::{events::MapEvent, ContainerId, InstanceId, MapFactory, MapOptions, MapWidget},
    Result,
};

pub struct MapSession {
    widget: Box<dyn MapWidget>,
    credential: Credential,
    fog: FogConfig,
    atmosphere_applied: bool,
}

impl MapSession {
    /// Creates the instance and attaches the configured controls
    pub fn open(
        factory: &dyn MapFactory,
        container: ContainerId,
        credential: Credential,
        config: &MapViewConfig,
    ) -> Result<Self> {
        let options = MapOptions::from_config(container, config);
        let mut widget = factory.create_map_instance(&credential, &options)?;
        for control in &config.controls {
            widget.add_control(*control);
        }

        let mut session = Self {
            widget,
            credential,
            fog: config.fog.clone(),
            atmosphere_applied: false,
        };
        if session.widget.is_style_loaded() {
            session.apply_atmosphere();
        }

        log::info!(
            "map instance {} ready in {}",
            session.instance_id().0,
            session.container()
        );
        Ok(session)
    }

    pub fn map(&self) -> &dyn MapWidget {
        self.widget.as_ref()
    }

    pub fn map_mut(&mut self) -> &mut dyn MapWidget {
        self.widget.as_mut()
    }

    pub fn instance_id(&self) -> InstanceId {
        self.widget.instance_id()
    }

    pub fn container(&self) -> &ContainerId {
        self.widget.container()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn atmosphere_applied(&self) -> bool {
        self.atmosphere_applied
    }

    /// Session-level reaction to widget events
    pub fn handle_event(&mut self, event: &MapEvent) {
        if matches!(event, MapEvent::StyleLoaded) {
            self.apply_atmosphere();
        }
    }

    /// Fog is applied once per instance
    fn apply_atmosphere(&mut self) {
        if self.atmosphere_applied {
            return;
        }
        self.widget.set_fog(&self.fog);
        self.atmosphere_applied = true;
        log::debug!("atmosphere applied to instance {}", self.instance_id().0);
    }

    /// Destroys the instance now
    pub fn release(self) {}
}

impl Drop for MapSession {
    fn drop(&mut self) {
        self.widget.remove();
    }
}

/// Outcome of [`MapInitializer::sync`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A session for the same container and credential already exists
    Unchanged,
    /// A new instance was created (after releasing any previous one)
    Created(InstanceId),
    /// The previous instance was released and nothing replaced it
    Released(InstanceId),
    /// No session before, none wanted
    Idle,
}

pub struct MapInitializer {
    config: MapViewConfig,
    session: Option<MapSession>,
}

impl MapInitializer {
    pub fn new(config: MapViewConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&MapSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut MapSession> {
        self.session.as_mut()
    }

    /// True when `sync` with these inputs would do nothing
    pub fn is_current(
        &self,
        container: Option<&ContainerId>,
        credential: Option<&Credential>,
    ) -> bool {
        match (&self.session, container.zip(credential)) {
            (Some(session), Some((container, credential))) => {
                session.container() == container && session.credential() == credential
            }
            (None, None) => true,
            _ => false,
        }
    }

    /// Brings the session in line with the inputs: no-op when unchanged,
    /// otherwise releases the current instance and creates a new one when both
    /// a container and a credential are present
    pub fn sync(
        &mut self,
        factory: &dyn MapFactory,
        container: Option<&ContainerId>,
        credential: Option<&Credential>,
    ) -> Result<SyncOutcome> {
        if self.is_current(container, credential) {
            return Ok(if self.session.is_some() {
                SyncOutcome::Unchanged
            } else {
                SyncOutcome::Idle
            });
        }

        let released = self.release();
        match container.zip(credential) {
            Some((container, credential)) => {
                let session =
                    MapSession::open(factory, container.clone(), credential.clone(), &self.config)?;
                let id = session.instance_id();
                self.session = Some(session);
                Ok(SyncOutcome::Created(id))
            }
            None => Ok(released.map_or(SyncOutcome::Idle, SyncOutcome::Released)),
        }
    }

    /// Destroys the current instance, if any
    pub fn release(&mut self) -> Option<InstanceId> {
        self.session.take().map(|session| {
            let id = session.instance_id();
            session.release();
            log::debug!("map instance {} released", id.0);
            id
        })
    }
}
