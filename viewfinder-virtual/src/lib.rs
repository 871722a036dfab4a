//! # viewfinder-virtual
//!
//! In-process simulated camera backend for viewfinder.
//!
//! Provides:
//! - `VirtualCameraBackend`: one or more simulated sensors with configurable
//!   capabilities, open latency and injected open failures
//! - `VirtualCamera`: the exclusive handle; validates parameter writes and
//!   produces YUYV colour-bar stills
//! - `DeviceJournal`: what the device was asked to do, for assertions
//! - `VirtualOrientationProvider`: push tilt angles and display rotations
//! - `VirtualSurface`: a preview surface the host creates, resizes and destroys
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use viewfinder_core::{CaptureSession, SessionConfiguration};
//! use viewfinder_virtual::{VirtualCameraBackend, VirtualOrientationProvider, VirtualSurface};
//!
//! let backend = Arc::new(VirtualCameraBackend::default());
//! let surface = Arc::new(VirtualSurface::with_size(1, 1080, 1920));
//! let sensors = Arc::new(VirtualOrientationProvider::new());
//! let session = CaptureSession::new(backend, surface, sensors, SessionConfiguration::default())?;
//! session.start();
//! ```

pub mod device;
pub mod frames;
pub mod sensors;
pub mod surface;

pub use device::{DeviceJournal, VirtualCamera, VirtualCameraBackend, VirtualDeviceSpec};
pub use sensors::VirtualOrientationProvider;
pub use surface::VirtualSurface;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::{Duration, Instant};

    use viewfinder_core::{
        CameraBackend, CameraError, CaptureSession, CaptureStatus, CapturedPicture, DisplayRotation,
        FocusMode, SessionConfiguration, SessionDelegate, SessionState, Size,
    };

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[derive(Debug)]
    enum Event {
        Opened(CaptureStatus),
        OpenFailed(CameraError),
        Picture(CapturedPicture),
        Closed,
    }

    struct Recorder(mpsc::Sender<Event>);

    impl SessionDelegate for Recorder {
        fn on_state_changed(&self, _state: &SessionState) {}

        fn on_camera_opened(&self, status: &CaptureStatus) {
            let _ = self.0.send(Event::Opened(*status));
        }

        fn on_camera_open_failed(&self, error: &CameraError) {
            let _ = self.0.send(Event::OpenFailed(error.clone()));
        }

        fn on_picture_taken(&self, picture: &CapturedPicture) {
            let _ = self.0.send(Event::Picture(picture.clone()));
        }

        fn on_camera_closed(&self) {
            let _ = self.0.send(Event::Closed);
        }

        fn on_error(&self, _error: &CameraError) {}
    }

    struct Rig {
        backend: Arc<VirtualCameraBackend>,
        sensors: Arc<VirtualOrientationProvider>,
        surface: Arc<VirtualSurface>,
        session: CaptureSession<VirtualCameraBackend>,
        events: mpsc::Receiver<Event>,
    }

    impl Rig {
        fn new(backend: VirtualCameraBackend, surface: VirtualSurface, config: SessionConfiguration) -> Self {
            Self::with_sensors(backend, surface, VirtualOrientationProvider::new(), config)
        }

        fn with_sensors(
            backend: VirtualCameraBackend,
            surface: VirtualSurface,
            sensors: VirtualOrientationProvider,
            config: SessionConfiguration,
        ) -> Self {
            let backend = Arc::new(backend);
            let sensors = Arc::new(sensors);
            let surface = Arc::new(surface);
            let session =
                CaptureSession::new(Arc::clone(&backend), surface.clone(), sensors.clone(), config).unwrap();
            let (tx, events) = mpsc::channel();
            session.set_delegate(Arc::new(Recorder(tx)));
            Self {
                backend,
                sensors,
                surface,
                session,
                events,
            }
        }

        fn back_camera() -> Self {
            Self::new(
                VirtualCameraBackend::default(),
                VirtualSurface::with_size(9, 1080, 1920),
                SessionConfiguration::default(),
            )
        }

        fn next(&self) -> Event {
            self.events.recv_timeout(TIMEOUT).unwrap()
        }

        fn open(&self) -> CaptureStatus {
            self.session.start();
            match self.next() {
                Event::Opened(status) => status,
                other => panic!("expected open, got {:?}", other),
            }
        }

        fn capture(&self) -> CapturedPicture {
            self.session.take_picture();
            match self.next() {
                Event::Picture(picture) => picture,
                other => panic!("expected picture, got {:?}", other),
            }
        }

        fn settle(&self) {
            assert!(self.session.sync(TIMEOUT));
        }
    }

    fn wait_until(cond: impl Fn() -> bool) {
        let deadline = Instant::now() + TIMEOUT;
        while !cond() {
            assert!(Instant::now() < deadline, "condition not reached");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn back_camera_previews_and_captures() {
        let rig = Rig::back_camera();
        let status = rig.open();
        assert_eq!(status.max_zoom, 30);
        assert_eq!(rig.session.state(), SessionState::Previewing);

        let journal = rig.backend.journal();
        let params = journal.last_parameters().unwrap();
        assert_eq!(params.preview_size, Size::new(1440, 1080));
        assert_eq!(params.picture_size, Size::new(1600, 1200));
        assert_eq!(params.focus_mode, Some(FocusMode::ContinuousPicture));
        assert_eq!(params.rotation, 90);
        assert_eq!(journal.display_orientation(), Some(90));
        assert_eq!(journal.preview_target(), Some(9));
        assert!(journal.is_streaming());

        let picture = rig.capture();
        assert_eq!(picture.data.len(), 1600 * 1200 * 2);
        assert_eq!((picture.metadata.width, picture.metadata.height), (1600, 1200));
        assert_eq!(picture.metadata.rotation, 90);
        assert_eq!(journal.captures(), 1);
        assert!(journal.is_streaming());
        assert_eq!(rig.session.state(), SessionState::Previewing);
    }

    #[test]
    fn front_camera_uses_mirrored_rotation_and_fixed_focus() {
        let config = SessionConfiguration {
            camera_index: 1,
            ..Default::default()
        };
        let rig = Rig::new(
            VirtualCameraBackend::default(),
            VirtualSurface::with_size(2, 1080, 1920),
            config,
        );
        rig.open();

        let journal = rig.backend.journal();
        let params = journal.last_parameters().unwrap();
        assert_eq!(params.focus_mode, Some(FocusMode::Fixed));
        assert_eq!(params.preview_size, Size::new(960, 720));
        assert_eq!(params.picture_size, Size::new(1280, 960));
        assert_eq!(params.rotation, 270);
        assert_eq!(journal.display_orientation(), Some(90));

        assert!(matches!(rig.session.set_zoom(1), Err(CameraError::InvalidParameter(_))));
        assert_eq!(rig.capture().data.len(), 1280 * 960 * 2);
    }

    #[test]
    fn busy_device_reports_open_failure() {
        let rig = Rig::back_camera();
        let held = rig.backend.open(0).unwrap();

        rig.session.start();
        assert!(matches!(
            rig.next(),
            Event::OpenFailed(CameraError::ResourceUnavailable(_))
        ));
        assert_eq!(rig.session.state(), SessionState::Closed);

        drop(held);
        rig.open();
    }

    #[test]
    fn stop_during_slow_open_releases_quietly() {
        let spec = VirtualDeviceSpec {
            open_delay: Duration::from_millis(100),
            ..Default::default()
        };
        let rig = Rig::new(
            VirtualCameraBackend::new(spec),
            VirtualSurface::with_size(1, 1080, 1920),
            SessionConfiguration::default(),
        );
        rig.session.start();
        rig.session.stop();
        assert!(matches!(rig.next(), Event::Closed));

        let journal = rig.backend.journal();
        wait_until(|| journal.releases() == 1);
        rig.settle();
        assert!(rig.events.try_recv().is_err());
        assert_eq!(journal.flushes(), 0);
        assert!(!rig.backend.is_in_use());
    }

    #[test]
    fn missing_orientation_sensor_still_previews() {
        let rig = Rig::with_sensors(
            VirtualCameraBackend::default(),
            VirtualSurface::with_size(1, 1080, 1920),
            VirtualOrientationProvider::unavailable(),
            SessionConfiguration::default(),
        );
        rig.open();
        assert_eq!(rig.session.state(), SessionState::Previewing);
        assert!(!rig.sensors.is_listening());
    }

    #[test]
    fn surface_lifecycle_drives_preview() {
        let rig = Rig::new(
            VirtualCameraBackend::default(),
            VirtualSurface::new(4),
            SessionConfiguration::default(),
        );
        rig.open();
        assert_eq!(rig.session.state(), SessionState::Open);

        rig.session.notify_surface(rig.surface.create(480, 640));
        rig.settle();
        assert_eq!(rig.session.state(), SessionState::Previewing);
        let params = rig.backend.journal().last_parameters().unwrap();
        assert_eq!(params.preview_size, Size::new(640, 480));

        rig.session.notify_surface(rig.surface.destroy());
        rig.settle();
        assert_eq!(rig.session.state(), SessionState::Open);
        assert!(!rig.backend.journal().is_streaming());
    }

    #[test]
    fn tilting_updates_picture_rotation() {
        let rig = Rig::back_camera();
        rig.open();

        rig.sensors.tilt(270);
        rig.settle();
        assert_eq!(rig.backend.journal().last_parameters().map(|p| p.rotation), Some(0));

        rig.sensors.rotate_display(DisplayRotation::Rotation270);
        rig.settle();
        assert_eq!(rig.backend.journal().display_orientation(), Some(180));

        assert_eq!(rig.capture().metadata.rotation, 0);
    }

    #[test]
    fn stop_releases_device_and_reports_once() {
        let rig = Rig::back_camera();
        rig.open();
        rig.session.stop();
        rig.session.stop();
        assert!(matches!(rig.next(), Event::Closed));
        rig.settle();

        assert!(rig.events.try_recv().is_err());
        assert_eq!(rig.backend.journal().releases(), 1);
        assert!(!rig.backend.is_in_use());
        assert!(!rig.sensors.is_listening());
    }
}
