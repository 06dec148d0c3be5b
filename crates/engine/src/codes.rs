//! Tenant code allocation
//!
//! Client codes are unique and assigned at creation time against a store
//! counter. Uniqueness is enforced here with retry-on-conflict: the counter
//! guarantees fresh sequence numbers, and the conflict check covers codes
//! that were imported or hand-assigned outside the counter's range.

use casillero_core::error::{Error, Result};
use casillero_core::limits::CODE_ALLOC_MAX_RETRIES;
use casillero_core::traits::{DirectoryStore, WriteOp};
use casillero_core::types::TenantId;
use tracing::warn;

/// Counter document backing code allocation
const CODE_COUNTER: &str = "tenant-code";

/// Format a sequence number as a client code
fn format_code(seq: u64) -> String {
    format!("CL{seq:05}")
}

/// Allocate the next unused client code and assign it to `tenant`.
///
/// Returns the assigned code.
///
/// # Errors
///
/// Returns `InvalidOperation` when every retry hit an existing code, or a
/// store error from the counter, the conflict check, or the commit.
pub fn allocate_code<S: DirectoryStore>(store: &S, tenant: &TenantId) -> Result<String> {
    for _ in 0..CODE_ALLOC_MAX_RETRIES {
        let seq = store.next_counter(CODE_COUNTER)?;
        let code = format_code(seq);
        if let Some((existing, _)) = store.tenant_by_code(&code)? {
            warn!(%code, conflicting_tenant = %existing, "allocated code already taken, retrying");
            continue;
        }
        store.commit(vec![WriteOp::SetTenantCode {
            id: tenant.clone(),
            code: code.clone(),
        }])?;
        return Ok(code);
    }
    Err(Error::InvalidOperation(format!(
        "tenant code allocation exhausted {CODE_ALLOC_MAX_RETRIES} retries"
    )))
}
