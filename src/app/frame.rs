use crate::assets::{TextureEvent, TextureResolver};
use crate::config::{TextureFailurePolicy, ViewerConfig};
use crate::params::ParameterStore;
use crate::scene::{derive_light, derive_material, FrameState, MaterialState, RotationDriver};
use crate::ui::TextureStatus;
use glam::Vec3;

/// Per-frame glue between the parameter store, the texture resolver and the
/// binders. One `prepare` call per displayed frame.
pub struct FrameDriver {
    rotation: RotationDriver,
    light_direction: Vec3,
    failure_policy: TextureFailurePolicy,
    last_material: Option<MaterialState>,
    last_revision: Option<u64>,
    status: TextureStatus,
}

impl FrameDriver {
    pub fn new(rotation_step: f32, light_direction: Vec3, failure_policy: TextureFailurePolicy) -> Self {
        Self {
            rotation: RotationDriver::new(rotation_step),
            light_direction,
            failure_policy,
            last_material: None,
            last_revision: None,
            status: TextureStatus::Idle,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(
            config.rotation_step,
            Vec3::from_array(config.light_direction),
            config.texture_failure_policy,
        )
    }

    pub fn texture_status(&self) -> &TextureStatus {
        &self.status
    }

    pub fn prepare(&mut self, store: &mut ParameterStore, resolver: &mut TextureResolver) -> FrameState {
        for event in resolver.poll() {
            self.on_texture_event(store, resolver, event);
        }

        let requested = store.texture_source().cloned();
        if let Err(err) = resolver.resolve(requested.as_ref()) {
            log::warn!("Texture request failed: {}", err);
            let name = requested
                .as_ref()
                .map(|source| source.display_name())
                .unwrap_or_default();
            self.status = TextureStatus::Failed {
                name,
                message: err.to_string(),
            };
            if self.failure_policy == TextureFailurePolicy::Clear {
                store.set_texture_source(None);
                let _ = resolver.resolve(None);
            }
        } else {
            match &requested {
                // A failure that cleared the source stays visible until the next pick.
                None if self.failure_policy == TextureFailurePolicy::Clear
                    && matches!(self.status, TextureStatus::Failed { .. }) => {}
                None => self.status = TextureStatus::Idle,
                Some(source) if resolver.is_pending() => {
                    self.status = TextureStatus::Loading {
                        name: source.display_name(),
                    };
                }
                Some(_) => {}
            }
        }

        if self.last_revision != Some(store.revision()) {
            log::debug!("Parameter revision {}", store.revision());
            self.last_revision = Some(store.revision());
        }

        let orientation = self.rotation.tick();
        let params = store.snapshot();
        let material = match self.last_material {
            Some(previous) if resolver.is_pending() => previous,
            _ => derive_material(&params, resolver.current()),
        };
        self.last_material = Some(material);
        let light = derive_light(&params, self.light_direction);

        FrameState {
            orientation,
            material,
            light,
        }
    }

    fn on_texture_event(
        &mut self,
        store: &mut ParameterStore,
        resolver: &TextureResolver,
        event: TextureEvent,
    ) {
        let name = store
            .texture_source()
            .map(|source| source.display_name())
            .unwrap_or_default();
        match event {
            TextureEvent::Loaded { source } => {
                let texture = resolver.current();
                if texture.loaded_for(source) {
                    let (width, height) = texture.image().dimensions();
                    self.status = TextureStatus::Applied {
                        name,
                        width,
                        height,
                        fingerprint: texture.fingerprint().unwrap_or_default().to_string(),
                    };
                }
            }
            TextureEvent::Failed { source, error } => {
                self.status = TextureStatus::Failed {
                    name,
                    message: error.to_string(),
                };
                if self.failure_policy == TextureFailurePolicy::Clear
                    && store.texture_source().map(|current| current.id()) == Some(source)
                {
                    log::info!("Clearing texture {} after failed decode", source);
                    store.set_texture_source(None);
                }
            }
        }
    }
}
