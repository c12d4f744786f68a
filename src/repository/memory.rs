use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard};

use super::{Repository, RepositoryError};
use crate::GeoRecord;

/// Reference [`Repository`] behind a single mutex. For tests and benchmarks, not production storage.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    data: Mutex<HashMap<IpAddr, GeoRecord>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<IpAddr, GeoRecord>>, RepositoryError> {
        self.data.lock().map_err(|_| RepositoryError::Poisoned)
    }
}

fn insert_unique(
    data: &mut HashMap<IpAddr, GeoRecord>,
    record: &GeoRecord,
) -> Result<(), RepositoryError> {
    if data.contains_key(&record.ip()) {
        return Err(RepositoryError::AlreadyExists(record.ip()));
    }
    data.insert(record.ip(), record.clone());
    Ok(())
}

impl Repository for MemoryRepository {
    fn store(&self, record: &GeoRecord) -> Result<(), RepositoryError> {
        let mut data = self.lock()?;
        insert_unique(&mut data, record)
    }

    /// Stops at the first conflict; records before it stay stored.
    fn store_many(&self, records: &[GeoRecord]) -> Result<(), RepositoryError> {
        let mut data = self.lock()?;
        for record in records {
            insert_unique(&mut data, record)?;
        }
        Ok(())
    }

    fn retrieve(&self, ip: IpAddr) -> Result<GeoRecord, RepositoryError> {
        let ip = ip.to_canonical();
        self.lock()?
            .get(&ip)
            .cloned()
            .ok_or(RepositoryError::NotFound(ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::parse_row;

    fn record(line: &str) -> GeoRecord {
        parse_row(line).unwrap()
    }

    #[test]
    fn store_then_retrieve() {
        let repo = MemoryRepository::new();
        let r = record("200.106.141.15,SI,Nepal,DuBuquemouth,-84.87503094689836,7.206435933364332,7823011346");
        repo.store(&r).unwrap();
        assert_eq!(repo.retrieve("200.106.141.15".parse().unwrap()).unwrap(), r);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn store_rejects_existing_ip() {
        let repo = MemoryRepository::new();
        repo.store(&record("1.2.3.4,SI,Nepal,A,1,2,3")).unwrap();
        let err = repo.store(&record("1.2.3.4,CZ,Chad,B,4,5,6")).unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists(_)));
        assert_eq!(repo.retrieve("1.2.3.4".parse().unwrap()).unwrap().city(), "A");
    }

    #[test]
    fn store_many_keeps_records_before_conflict() {
        let repo = MemoryRepository::new();
        let batch = [
            record("1.1.1.1,SI,Nepal,A,1,2,3"),
            record("2.2.2.2,SI,Nepal,B,1,2,3"),
            record("1.1.1.1,SI,Nepal,C,1,2,3"),
            record("3.3.3.3,SI,Nepal,D,1,2,3"),
        ];
        assert!(repo.store_many(&batch).is_err());
        assert_eq!(repo.count().unwrap(), 2);
        assert!(repo.retrieve("3.3.3.3".parse().unwrap()).is_err());
    }

    #[test]
    fn retrieve_missing_is_not_found() {
        let repo = MemoryRepository::new();
        let err = repo.retrieve("200.20.141.16".parse().unwrap()).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let repo = MemoryRepository::new();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = repo.data.lock().unwrap();
            panic!("poison the lock");
        }));
        assert!(matches!(repo.count(), Err(RepositoryError::Poisoned)));
        assert!(matches!(
            repo.store(&record("1.2.3.4,SI,Nepal,A,1,2,3")),
            Err(RepositoryError::Poisoned)
        ));
    }

    #[test]
    fn retrieve_folds_mapped_ipv6() {
        let repo = MemoryRepository::new();
        repo.store(&record("10.0.0.1,SI,Nepal,A,1,2,3")).unwrap();
        assert!(repo.retrieve("::ffff:10.0.0.1".parse().unwrap()).is_ok());
    }
}
