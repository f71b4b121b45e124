use embedded_storage::{ReadStorage, Storage};
use esp_storage::FlashStorage;
use linkboot::{
    config::{RecordCheck, RECORD_LEN, RECORD_VERSION},
    PersistentStorage, ProvisioningRecord, StorageError,
};
use log::info;

/// Provisioning record in the last flash sector.
pub(crate) struct FlashProvisioning<'d> {
    flash: FlashStorage<'d>,
    offset: u32,
    record: Option<ProvisioningRecord>,
}

impl<'d> FlashProvisioning<'d> {
    pub(crate) fn new(flash_peripheral: esp_hal::peripherals::FLASH<'d>) -> Self {
        let flash = FlashStorage::new(flash_peripheral).multicore_auto_park();
        let capacity = flash.capacity() as u32;
        let offset = capacity.saturating_sub(FlashStorage::SECTOR_SIZE);
        Self {
            flash,
            offset,
            record: None,
        }
    }

    fn read_record(&mut self) -> Result<ProvisioningRecord, StorageError> {
        let mut bytes = [0u8; RECORD_LEN];
        self.flash
            .read(self.offset, &mut bytes)
            .map_err(|_| StorageError::Io("flash read failed"))?;
        Ok(ProvisioningRecord::from_bytes(bytes))
    }
}

impl PersistentStorage for FlashProvisioning<'_> {
    fn init(&mut self) -> Result<(), StorageError> {
        let record = self.read_record()?;
        match record.check() {
            RecordCheck::Blank => {
                self.record = None;
                Ok(())
            }
            RecordCheck::Valid => {
                self.record = Some(record);
                Ok(())
            }
            RecordCheck::UnknownVersion(version) if version > RECORD_VERSION => {
                Err(StorageError::NewVersionFound)
            }
            RecordCheck::UnknownVersion(_) | RecordCheck::Corrupt => Err(StorageError::Corrupted),
        }
    }

    fn erase(&mut self) -> Result<(), StorageError> {
        let blank = [0xFFu8; RECORD_LEN];
        self.flash
            .write(self.offset, &blank)
            .map_err(|_| StorageError::Io("flash erase failed"))?;
        self.record = None;
        info!("flash: provisioning sector erased at {:#x}", self.offset);
        Ok(())
    }

    fn load_provisioning(&mut self) -> Result<Option<ProvisioningRecord>, StorageError> {
        Ok(self.record.clone())
    }
}
