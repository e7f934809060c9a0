//! Contract gateway
//!
//! Performs single ledger writes (appointment booking, cancellation, file
//! anchoring) and translates each outcome into a plain value or a typed
//! failure. Every write is an irreversible, externally visible state change
//! on the ledger; the gateway reports outcomes accurately and never
//! compensates for partial failure.

pub mod guard;


use std::sync::{Arc, RwLock};

use chrono::{NaiveDate, NaiveTime};
use tokio::time::sleep;
use tracing::{debug, info, instrument};

use crate::chain::abi::{self, Calldata};
use crate::chain::rpc::{LedgerRpc, TransactionReceipt};
use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::wallet::WalletCapability;

pub use guard::{OperationGuard, OperationPermit};

/// Form input for one booking. Transient: encoded at submission, then
/// discarded. `reason` and `notes` stay client-side; the contract only
/// takes the schedule and an optional metadata reference.
#[derive(Clone, Debug)]
pub struct AppointmentRequest {
    pub doctor_id: u64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub reason: String,
    pub notes: String,
}

impl AppointmentRequest {
    /// Scheduled moment as UTC epoch seconds, the contract's time base
    pub fn epoch_seconds(&self) -> i64 {
        self.date.and_time(self.time).and_utc().timestamp()
    }
}

/// Successful booking outcome
#[derive(Clone, Debug)]
pub struct BookingConfirmation {
    pub appointment_id: u128,
    pub transaction_hash: String,
}

/// Read-only view of one appointment record, decoded from the
/// `appointments(uint256)` getter. Never cached; the ledger owns it.
#[derive(Clone, Debug)]
pub struct AppointmentDetails {
    pub patient: String,
    pub doctor_id: u64,
    pub scheduled_at: u64,
    pub cancelled: bool,
}

pub struct ContractGateway {
    rpc: LedgerRpc,
    config: GatewayConfig,
    signer: RwLock<Option<String>>,
    booking_guard: OperationGuard,
    cancellation_guard: OperationGuard,
}

impl ContractGateway {
    pub fn new(provider: Arc<dyn WalletCapability>, config: GatewayConfig) -> Self {
        Self {
            rpc: LedgerRpc::new(provider),
            config,
            signer: RwLock::new(None),
            booking_guard: OperationGuard::new(),
            cancellation_guard: OperationGuard::new(),
        }
    }

    /// Bind the authorized account that signs writes. Until this runs,
    /// every gateway operation fails with `GatewayUninitialized`.
    pub fn initialize(&self, address: &str) -> Result<()> {
        abi::parse_address(address)
            .map_err(|_| Error::InvalidRequest(format!("{address:?} is not a valid account address")))?;
        *self.signer.write().expect("signer lock poisoned") = Some(address.to_string());
        debug!(address, "gateway bound to signer account");
        Ok(())
    }

    fn signer(&self) -> Result<String> {
        self.signer
            .read()
            .expect("signer lock poisoned")
            .clone()
            .ok_or(Error::GatewayUninitialized)
    }

    /// Consultation fee currently listed for a doctor, in wei
    pub async fn doctor_fee(&self, doctor_id: u64) -> Result<u128> {
        self.signer()?;
        self.registry_fee(doctor_id).await
    }

    async fn registry_fee(&self, doctor_id: u64) -> Result<u128> {
        let data = Calldata::new(abi::SEL_DOCTORS).uint(doctor_id).build();
        let ret = self.rpc.call(&self.config.appointment_manager, &data).await?;
        // Registry entry layout: (address account, uint256 consultationFee, bool active)
        abi::decode_u128(ret.word(1)?)
    }

    /// Book from form input; the date and time are encoded as UTC
    pub async fn book(&self, request: &AppointmentRequest) -> Result<BookingConfirmation> {
        let when = u64::try_from(request.epoch_seconds()).map_err(|_| {
            Error::InvalidRequest("appointment time precedes the unix epoch".to_string())
        })?;
        self.book_appointment(request.doctor_id, when, "").await
    }

    /// Book one appointment. The consultation fee is read from the doctor
    /// registry at call time and attached to the transaction unchanged; the
    /// contract's own validation decides whether the booking stands.
    #[instrument(skip(self, metadata_ref))]
    pub async fn book_appointment(
        &self,
        doctor_id: u64,
        when_epoch_seconds: u64,
        metadata_ref: &str,
    ) -> Result<BookingConfirmation> {
        let from = self.signer()?;
        let _permit = self.booking_guard.acquire("booking")?;

        let fee = self.registry_fee(doctor_id).await?;
        debug!(fee, "consultation fee read from registry");

        let data = Calldata::new(abi::SEL_BOOK_APPOINTMENT)
            .uint(doctor_id)
            .uint(when_epoch_seconds as u128)
            .string(metadata_ref)
            .build();
        let hash = self
            .rpc
            .send_transaction(&from, &self.config.appointment_manager, Some(fee), &data)
            .await?;
        info!(%hash, "booking transaction submitted");

        let receipt = self.wait_for_inclusion(&hash).await?;
        if !receipt.succeeded() {
            return Err(Error::TransactionReverted { hash });
        }
        let appointment_id = self.booking_event_id(&receipt).ok_or(Error::EventNotFound {
            hash: receipt.transaction_hash.clone(),
            event: "AppointmentBooked",
        })?;
        info!(appointment_id, "appointment booked");
        Ok(BookingConfirmation {
            appointment_id,
            transaction_hash: receipt.transaction_hash,
        })
    }

    fn booking_event_id(&self, receipt: &TransactionReceipt) -> Option<u128> {
        receipt
            .logs
            .iter()
            .filter(|log| log.address.eq_ignore_ascii_case(&self.config.appointment_manager))
            .find(|log| {
                log.topics
                    .first()
                    .is_some_and(|topic| topic.eq_ignore_ascii_case(abi::TOPIC_APPOINTMENT_BOOKED))
            })
            .and_then(|log| log.topics.get(1))
            .and_then(|topic| abi::parse_quantity(topic).ok())
    }

    /// Cancel an appointment; returns the transaction hash
    #[instrument(skip(self))]
    pub async fn cancel_appointment(&self, appointment_id: u128) -> Result<String> {
        let from = self.signer()?;
        let _permit = self.cancellation_guard.acquire("cancellation")?;

        let data = Calldata::new(abi::SEL_CANCEL_APPOINTMENT)
            .uint(appointment_id)
            .build();
        let hash = self
            .rpc
            .send_transaction(&from, &self.config.appointment_manager, None, &data)
            .await?;
        info!(%hash, "cancellation transaction submitted");

        let receipt = self.wait_for_inclusion(&hash).await?;
        if !receipt.succeeded() {
            return Err(Error::TransactionReverted { hash });
        }
        Ok(receipt.transaction_hash)
    }

    /// Read one appointment record from the ledger
    #[instrument(skip(self))]
    pub async fn appointment_details(&self, appointment_id: u128) -> Result<AppointmentDetails> {
        self.signer()?;
        let data = Calldata::new(abi::SEL_APPOINTMENTS).uint(appointment_id).build();
        let ret = self.rpc.call(&self.config.appointment_manager, &data).await?;
        Ok(AppointmentDetails {
            patient: abi::decode_address(ret.word(0)?)?,
            doctor_id: abi::decode_u64(ret.word(1)?)?,
            scheduled_at: abi::decode_u64(ret.word(2)?)?,
            cancelled: abi::decode_bool(ret.word(3)?)?,
        })
    }

    /// Anchor a content identifier on the file vault contract; returns the
    /// transaction hash
    #[instrument(skip(self))]
    pub async fn record_file(&self, content_id: &str, display_name: &str) -> Result<String> {
        let from = self.signer()?;

        let data = Calldata::new(abi::SEL_UPLOAD_FILE)
            .string(content_id)
            .string(display_name)
            .build();
        let hash = self
            .rpc
            .send_transaction(&from, &self.config.file_vault, None, &data)
            .await?;
        info!(%hash, content_id, "file record transaction submitted");

        let receipt = self.wait_for_inclusion(&hash).await?;
        if !receipt.succeeded() {
            return Err(Error::TransactionReverted { hash });
        }
        Ok(receipt.transaction_hash)
    }

    /// Poll for the receipt until inclusion or the poll budget runs out.
    /// Inclusion latency belongs to the ledger; the budget only bounds how
    /// long the caller is left hanging.
    async fn wait_for_inclusion(&self, hash: &str) -> Result<TransactionReceipt> {
        let attempts = self.config.receipt_poll_attempts;
        for attempt in 1..=attempts {
            if let Some(receipt) = self.rpc.transaction_receipt(hash).await? {
                debug!(attempt, block = ?receipt.block_number, "transaction included");
                return Ok(receipt);
            }
            if attempt < attempts {
                sleep(self.config.receipt_poll_interval()).await;
            }
        }
        Err(Error::InclusionTimeout {
            hash: hash.to_string(),
            attempts,
        })
    }
}
