//! Locating the user
//!
//! A one-shot position request against a [`GeolocationProvider`]. The state
//! moves `Idle → Locating → Located | Failed` and every terminal state produces
//! exactly one notification.

use std::time::Duration;

use async_trait::async_trait;

use crate::{
    constants::GEOLOCATION_TIMEOUT_MS,
    core::geo::LngLat,
    map::notify::{LogNotifier, Notification, Notifier},
};

/// Options of a position request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Zero disables cached positions
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_millis(GEOLOCATION_TIMEOUT_MS),
            maximum_age: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Permissão de localização negada")]
    PermissionDenied,

    #[error("Localização indisponível")]
    PositionUnavailable,

    #[error("Tempo esgotado ao obter localização")]
    Timeout,

    #[error("Geolocalização não é suportada pelo seu navegador")]
    Unsupported,
}

impl GeolocationError {
    /// Maps the numeric codes position APIs report (1, 2, 3)
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => GeolocationError::PermissionDenied,
            3 => GeolocationError::Timeout,
            _ => GeolocationError::PositionUnavailable,
        }
    }
}

#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self, options: &PositionOptions) -> Result<LngLat, GeolocationError>;
}

/// Provider that always answers the same way
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Result<LngLat, GeolocationError>);

#[async_trait]
impl GeolocationProvider for FixedPosition {
    fn is_supported(&self) -> bool {
        self.0 != Err(GeolocationError::Unsupported)
    }

    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<LngLat, GeolocationError> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationState {
    Idle,
    Locating,
    Located(LngLat),
    Failed(GeolocationError),
}

pub struct UserLocation<P, N = LogNotifier> {
    provider: P,
    notifier: N,
    options: PositionOptions,
    state: LocationState,
}

impl<P: GeolocationProvider> UserLocation<P, LogNotifier> {
    pub fn new(provider: P) -> Self {
        Self::with_notifier(provider, LogNotifier)
    }
}

impl<P: GeolocationProvider, N: Notifier> UserLocation<P, N> {
    pub fn with_notifier(provider: P, notifier: N) -> Self {
        Self {
            provider,
            notifier,
            options: PositionOptions::default(),
            state: LocationState::Idle,
        }
    }

    pub fn with_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> LocationState {
        self.state
    }

    pub fn is_locating(&self) -> bool {
        self.state == LocationState::Locating
    }

    pub fn location(&self) -> Option<LngLat> {
        match self.state {
            LocationState::Located(coordinates) => Some(coordinates),
            _ => None,
        }
    }

    /// Message of the last failure
    pub fn error(&self) -> Option<String> {
        match self.state {
            LocationState::Failed(error) => Some(error.to_string()),
            _ => None,
        }
    }

    pub async fn get_user_location(&mut self) -> Option<LngLat> {
        if !self.provider.is_supported() {
            return self.fail(GeolocationError::Unsupported);
        }

        self.state = LocationState::Locating;
        match self.request().await {
            Ok(coordinates) => {
                self.state = LocationState::Located(coordinates);
                log::debug!("user located at {}", coordinates);
                self.notifier.notify(Notification::success(
                    "Localização encontrada",
                    "Mostrando sua posição no mapa",
                ));
                Some(coordinates)
            }
            Err(error) => self.fail(error),
        }
    }

    #[cfg(feature = "tokio-runtime")]
    async fn request(&self) -> Result<LngLat, GeolocationError> {
        tokio::time::timeout(
            self.options.timeout,
            self.provider.current_position(&self.options),
        )
        .await
        .unwrap_or(Err(GeolocationError::Timeout))
    }

    #[cfg(not(feature = "tokio-runtime"))]
    async fn request(&self) -> Result<LngLat, GeolocationError> {
        self.provider.current_position(&self.options).await
    }

    fn fail(&mut self, error: GeolocationError) -> Option<LngLat> {
        self.state = LocationState::Failed(error);
        log::warn!("geolocation failed: {}", error);
        self.notifier
            .notify(Notification::error("Erro de localização", error.to_string()));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::notify::{NotificationLevel, RecordingNotifier};

    struct SlowProvider;

    #[async_trait]
    impl GeolocationProvider for SlowProvider {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<LngLat, GeolocationError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(LngLat::new(0.0, 0.0))
        }
    }

    #[test]
    fn test_error_codes_and_messages() {
        assert_eq!(GeolocationError::from_code(1), GeolocationError::PermissionDenied);
        assert_eq!(GeolocationError::from_code(2), GeolocationError::PositionUnavailable);
        assert_eq!(GeolocationError::from_code(3), GeolocationError::Timeout);
        assert_eq!(
            GeolocationError::PermissionDenied.to_string(),
            "Permissão de localização negada"
        );
        assert_eq!(
            GeolocationError::Unsupported.to_string(),
            "Geolocalização não é suportada pelo seu navegador"
        );
    }

    #[test]
    fn test_default_options() {
        let options = PositionOptions::default();
        assert!(options.enable_high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.maximum_age, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_success_notifies_once() {
        let notifier = RecordingNotifier::new();
        let here = LngLat::new(-32.41, -3.84);
        let mut location = UserLocation::with_notifier(FixedPosition(Ok(here)), notifier.clone());

        assert_eq!(location.get_user_location().await, Some(here));
        assert_eq!(location.state(), LocationState::Located(here));
        assert!(!location.is_locating());

        let seen = notifier.notifications();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].level, NotificationLevel::Success);
    }

    #[tokio::test]
    async fn test_permission_denied() {
        let notifier = RecordingNotifier::new();
        let mut location = UserLocation::with_notifier(
            FixedPosition(Err(GeolocationError::from_code(1))),
            notifier.clone(),
        );

        assert_eq!(location.get_user_location().await, None);
        assert!(!location.is_locating());
        assert_eq!(
            location.error().as_deref(),
            Some("Permissão de localização negada")
        );

        let seen = notifier.notifications();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].level, NotificationLevel::Error);
        assert_eq!(seen[0].message, "Permissão de localização negada");
    }

    #[tokio::test]
    async fn test_unsupported_never_locates() {
        let notifier = RecordingNotifier::new();
        let mut location = UserLocation::with_notifier(
            FixedPosition(Err(GeolocationError::Unsupported)),
            notifier.clone(),
        );
        assert_eq!(location.get_user_location().await, None);
        assert_eq!(location.state(), LocationState::Failed(GeolocationError::Unsupported));
        assert_eq!(notifier.notifications().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let notifier = RecordingNotifier::new();
        let mut location = UserLocation::with_notifier(SlowProvider, notifier.clone()).with_options(
            PositionOptions {
                timeout: Duration::from_millis(100),
                ..PositionOptions::default()
            },
        );

        assert_eq!(location.get_user_location().await, None);
        assert_eq!(
            location.error().as_deref(),
            Some("Tempo esgotado ao obter localização")
        );
        assert_eq!(notifier.notifications().len(), 1);
    }
}
