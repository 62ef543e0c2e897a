use std::sync::Arc;

use glam::Vec3;

use super::{ViewerKey, ViewerState};
use crate::asset::AssetSource;
use crate::camera::{Camera, OrbitController};
use crate::catalog::ModelDescriptor;
use crate::error::{ViewerInitError, ViewerInitReason};
use crate::host::{MountPoint, SurfaceProvider};
use crate::options::Options;
use crate::scene::{Light, Scene};

/// Builds fully initialized viewers from one descriptor and one mount point.
#[derive(Debug, Clone, Default)]
pub struct ViewerFactory {
    options: Options,
}

impl ViewerFactory {
    /// Factory applying `options` to every viewer it builds.
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Options applied to new viewers.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Build the viewer for `descriptor` on `mount`.
    ///
    /// The returned viewer has its surface sized to the mount point, the
    /// default lights installed and the camera framed on the origin. Its
    /// asset request has been submitted to `assets` and will complete
    /// later.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerInitError`] if the mount point is zero-sized or the
    /// surface cannot be created. Nothing is requested from `assets` then.
    pub fn create<P, A>(
        &self,
        provider: &mut P,
        assets: &mut A,
        key: ViewerKey,
        descriptor: Arc<ModelDescriptor>,
        mount: &P::Mount,
        mount_index: usize,
    ) -> Result<ViewerState<P::Surface>, ViewerInitError>
    where
        P: SurfaceProvider,
        A: AssetSource + ?Sized,
    {
        let identity = descriptor.identity;
        let (width, height) = mount.size();
        if width == 0 || height == 0 {
            return Err(ViewerInitError {
                identity,
                reason: ViewerInitReason::ZeroSizedMount { width, height },
            });
        }

        let surface =
            provider
                .create_surface(mount)
                .map_err(|e| ViewerInitError {
                    identity,
                    reason: ViewerInitReason::Surface(e),
                })?;

        let lighting = &self.options.lighting;
        let mut scene = Scene::new(lighting.background);
        scene.add_light(Light::Ambient {
            color: lighting.ambient_color,
            intensity: lighting.ambient_intensity,
        });
        scene.add_light(Light::Directional {
            color: lighting.directional_color,
            intensity: lighting.directional_intensity,
            position: Vec3::from_array(lighting.directional_position),
        });

        let camera =
            Camera::framed(width as f32 / height as f32, &self.options.camera);
        let controller =
            OrbitController::new(&camera, height, &self.options.controls);

        assets.request(key, &descriptor.asset_path);
        log::info!(
            "viewer {} ({}) created at {width}x{height}, loading {}",
            identity,
            descriptor.display_name,
            descriptor.asset_path
        );

        Ok(ViewerState {
            key,
            mount_index,
            descriptor,
            surface,
            camera,
            controller,
            scene,
            asset: None,
            spin_per_tick: self.options.animation.spin_per_tick,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::host::RenderSurface;
    use crate::testing::{FakeMount, FakeProvider, ManualAssetSource};
    use crate::viewer::ViewerPhase;

    fn descriptor(identity: u32) -> Arc<ModelDescriptor> {
        Arc::clone(Catalog::builtin().unwrap().get(identity).unwrap())
    }

    #[test]
    fn builds_pending_viewer_with_default_lights() {
        let factory = ViewerFactory::default();
        let mut provider = FakeProvider::default();
        let mut assets = ManualAssetSource::default();
        let key = ViewerKey::new(0, 1);

        let viewer = factory
            .create(
                &mut provider,
                &mut assets,
                key,
                descriptor(3),
                &FakeMount::new(800, 400),
                0,
            )
            .unwrap();

        assert_eq!(viewer.phase(), ViewerPhase::Pending);
        assert_eq!(viewer.surface().size(), (800, 400));
        assert!((viewer.camera().aspect - 2.0).abs() < 1e-6);
        assert_eq!(viewer.camera().eye, Vec3::new(0.0, 0.0, 50.0));
        assert_eq!(viewer.camera().target, Vec3::ZERO);
        assert_eq!(viewer.scene().background, [1.0, 1.0, 1.0]);

        let lights = viewer.scene().lights();
        assert_eq!(lights.len(), 2);
        assert!(lights[0].is_ambient());
        assert_eq!(
            lights[1],
            Light::Directional {
                color: [1.0, 1.0, 1.0],
                intensity: 3.0,
                position: Vec3::new(5.0, 10.0, 7.5),
            }
        );

        assert_eq!(assets.requests(), &[(key, "/glbfiles/rado.glb".to_owned())]);
    }

    #[test]
    fn zero_sized_mount_fails_without_requesting() {
        let factory = ViewerFactory::default();
        let mut provider = FakeProvider::default();
        let mut assets = ManualAssetSource::default();

        let err = factory
            .create(
                &mut provider,
                &mut assets,
                ViewerKey::new(0, 1),
                descriptor(0),
                &FakeMount::new(0, 300),
                0,
            )
            .err()
            .unwrap();

        assert!(matches!(
            err.reason,
            ViewerInitReason::ZeroSizedMount {
                width: 0,
                height: 300
            }
        ));
        assert!(assets.requests().is_empty());
        assert_eq!(provider.created(), 0);
    }

    #[test]
    fn surface_failure_is_reported() {
        let factory = ViewerFactory::default();
        let mut provider = FakeProvider::default();
        let mut assets = ManualAssetSource::default();
        let mount = FakeMount::new(100, 100).refusing_surface();

        let err = factory
            .create(
                &mut provider,
                &mut assets,
                ViewerKey::new(0, 1),
                descriptor(1),
                &mount,
                0,
            )
            .err()
            .unwrap();

        assert_eq!(err.identity, 1);
        assert!(matches!(err.reason, ViewerInitReason::Surface(_)));
        assert!(assets.requests().is_empty());
    }
}
