use std::path::PathBuf;
use tracing::{debug, info};

use super::{ServiceError, StartupServices};
use crate::catalog::Catalog;

#[derive(Clone, Debug)]
pub struct HostSettings {
    pub data_dir: PathBuf,
    pub dat_files: Vec<String>,
    pub list_file: String,
    pub small_pool_bytes: usize,
    pub large_pool_bytes: usize,
}

/// Startup services backed by the host filesystem and heap
pub struct HostServices {
    settings: HostSettings,
    small_pool: Vec<u8>,
    large_pool: Vec<u8>,
    dats: Vec<Vec<u8>>,
}

impl HostServices {
    pub fn new(settings: HostSettings) -> Self {
        debug!("Creating host services with settings: {:?}", settings);
        Self {
            settings,
            small_pool: Vec::new(),
            large_pool: Vec::new(),
            dats: Vec::new(),
        }
    }

    pub fn pool_capacity(&self) -> (usize, usize) {
        (self.small_pool.capacity(), self.large_pool.capacity())
    }

    fn reserve(pool: &mut Vec<u8>, name: &'static str, bytes: usize) -> Result<(), ServiceError> {
        pool.try_reserve_exact(bytes)
            .map_err(|_| ServiceError::PoolAllocation { name, bytes })?;
        info!("Reserved {} pool of {} KiB", name, bytes / 1024);
        Ok(())
    }
}

impl StartupServices for HostServices {
    fn create_small_pool(&mut self) -> Result<(), ServiceError> {
        Self::reserve(&mut self.small_pool, "small", self.settings.small_pool_bytes)
    }

    fn create_large_pool(&mut self) -> Result<(), ServiceError> {
        Self::reserve(&mut self.large_pool, "large", self.settings.large_pool_bytes)
    }

    fn load_dats(&mut self) -> Result<usize, ServiceError> {
        self.dats.clear();
        for name in &self.settings.dat_files {
            let path = self.settings.data_dir.join(name);
            if !path.exists() {
                return Err(ServiceError::MissingData(path.display().to_string()));
            }
            let bytes = std::fs::read(&path).map_err(|source| ServiceError::DataRead {
                path: path.display().to_string(),
                source,
            })?;
            debug!("Loaded {} ({} bytes)", path.display(), bytes.len());
            self.dats.push(bytes);
        }
        Ok(self.dats.len())
    }

    fn read_list(&mut self) -> Result<Catalog, ServiceError> {
        let path = self.settings.data_dir.join(&self.settings.list_file);
        Ok(Catalog::load(&path)?)
    }

    fn init_graphics(&mut self) {
        info!("Graphics helpers ready");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("discmenu-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn settings(dir: PathBuf) -> HostSettings {
        HostSettings {
            data_dir: dir,
            dat_files: vec!["box.dat".into(), "meta.dat".into()],
            list_file: "games.toml".into(),
            small_pool_bytes: 4 * 1024,
            large_pool_bytes: 16 * 1024,
        }
    }

    #[test]
    fn test_pools_are_reserved() {
        let mut services = HostServices::new(settings(PathBuf::from(".")));
        services.create_small_pool().unwrap();
        services.create_large_pool().unwrap();
        let (small, large) = services.pool_capacity();
        assert!(small >= 4 * 1024);
        assert!(large >= 16 * 1024);
    }

    #[test]
    fn test_oversized_pool_fails() {
        let mut config = settings(PathBuf::from("."));
        config.large_pool_bytes = usize::MAX;
        let mut services = HostServices::new(config);
        assert!(matches!(
            services.create_large_pool(),
            Err(ServiceError::PoolAllocation { name: "large", .. })
        ));
    }

    #[test]
    fn test_missing_dat_fails() {
        let dir = scratch_dir("missing-dat");
        fs::write(dir.join("box.dat"), b"box").unwrap();
        let _ = fs::remove_file(dir.join("meta.dat"));
        let mut services = HostServices::new(settings(dir.clone()));
        assert!(matches!(services.load_dats(), Err(ServiceError::MissingData(_))));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_loads_dats_and_list() {
        let dir = scratch_dir("load-all");
        fs::write(dir.join("box.dat"), b"box").unwrap();
        fs::write(dir.join("meta.dat"), b"meta").unwrap();
        fs::write(
            dir.join("games.toml"),
            "[[game]]\nname = \"Crazy Taxi\"\nproduct = \"MK-51035\"\n",
        )
        .unwrap();

        let mut services = HostServices::new(settings(dir.clone()));
        assert_eq!(services.load_dats().unwrap(), 2);
        let catalog = services.read_list().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(0).unwrap().name, "Crazy Taxi");
        fs::remove_dir_all(dir).unwrap();
    }
}
