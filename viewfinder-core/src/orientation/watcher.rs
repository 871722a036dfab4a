use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::CameraError;
use crate::models::orientation::{DeviceOrientation, DisplayRotation, OrientationEvent};
use crate::traits::orientation_provider::{OrientationCallback, OrientationProvider};

pub type DisplayRotationListener = Arc<dyn Fn(DisplayRotation) + Send + Sync + 'static>;
pub type DeviceOrientationListener = Arc<dyn Fn(DeviceOrientation) + Send + Sync + 'static>;

struct WatcherState {
    enabled: bool,
    /// Bumped on every enable so readings from an earlier epoch are dropped.
    epoch: u64,
    display_rotation: DisplayRotation,
    device_orientation: DeviceOrientation,
    display_listener: Option<DisplayRotationListener>,
    device_listener: Option<DeviceOrientationListener>,
}

/// Turns raw orientation readings into debounced change notifications.
///
/// Two independent streams: display rotation and bucketed device
/// orientation. Each listener slot holds at most one callback, which runs on
/// the provider's delivery thread, only while enabled and only when the
/// bucketed value actually changes.
pub struct OrientationWatcher {
    provider: Arc<dyn OrientationProvider>,
    state: Arc<Mutex<WatcherState>>,
}

impl OrientationWatcher {
    pub fn new(provider: Arc<dyn OrientationProvider>) -> Self {
        Self {
            provider,
            state: Arc::new(Mutex::new(WatcherState {
                enabled: false,
                epoch: 0,
                display_rotation: DisplayRotation::default(),
                device_orientation: DeviceOrientation::default(),
                display_listener: None,
                device_listener: None,
            })),
        }
    }

    /// Start listening. Current readings are valid as soon as this returns.
    pub fn enable(&self) -> Result<(), CameraError> {
        let epoch = {
            let mut s = self.state.lock();
            if s.enabled {
                return Ok(());
            }
            s.enabled = true;
            s.epoch += 1;
            s.display_rotation = self.provider.display_rotation();
            s.device_orientation = self
                .provider
                .sensor_angle()
                .and_then(DeviceOrientation::from_angle)
                .unwrap_or_default();
            s.epoch
        };

        let state = Arc::clone(&self.state);
        let callback: OrientationCallback = Arc::new(move |event| deliver(&state, epoch, event));
        if let Err(e) = self.provider.start(callback) {
            self.state.lock().enabled = false;
            return Err(e);
        }
        Ok(())
    }

    /// Stop listening. Safe to call repeatedly.
    pub fn disable(&self) {
        {
            let mut s = self.state.lock();
            if !s.enabled {
                return;
            }
            s.enabled = false;
        }
        self.provider.stop();
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    pub fn display_rotation(&self) -> DisplayRotation {
        self.state.lock().display_rotation
    }

    pub fn device_orientation(&self) -> DeviceOrientation {
        self.state.lock().device_orientation
    }

    /// Replace the display rotation listener.
    pub fn set_display_rotation_listener<F>(&self, listener: F)
    where
        F: Fn(DisplayRotation) + Send + Sync + 'static,
    {
        self.state.lock().display_listener = Some(Arc::new(listener));
    }

    /// Replace the device orientation listener.
    pub fn set_device_orientation_listener<F>(&self, listener: F)
    where
        F: Fn(DeviceOrientation) + Send + Sync + 'static,
    {
        self.state.lock().device_listener = Some(Arc::new(listener));
    }

    pub fn clear_listeners(&self) {
        let mut s = self.state.lock();
        s.display_listener = None;
        s.device_listener = None;
    }
}

impl Drop for OrientationWatcher {
    fn drop(&mut self) {
        self.disable();
    }
}

enum Change {
    Display(DisplayRotationListener, DisplayRotation),
    Device(DeviceOrientationListener, DeviceOrientation),
}

fn deliver(state: &Mutex<WatcherState>, epoch: u64, event: OrientationEvent) {
    let change = {
        let mut s = state.lock();
        if !s.enabled || s.epoch != epoch {
            return;
        }
        match event {
            OrientationEvent::DisplayRotation(rotation) => {
                if rotation == s.display_rotation {
                    return;
                }
                s.display_rotation = rotation;
                s.display_listener.clone().map(|l| Change::Display(l, rotation))
            }
            OrientationEvent::SensorAngle(angle) => {
                let Some(orientation) = DeviceOrientation::from_angle(angle) else {
                    return;
                };
                if orientation == s.device_orientation {
                    return;
                }
                s.device_orientation = orientation;
                s.device_listener.clone().map(|l| Change::Device(l, orientation))
            }
        }
    };

    // Listeners run outside the lock so they may query the watcher.
    match change {
        Some(Change::Display(listener, rotation)) => listener(rotation),
        Some(Change::Device(listener, orientation)) => listener(orientation),
        None => {}
    }
}
