//! Pure framing for the handshake fields.
//!
//! ## Wire Format
//!
//! ```text
//! client -> server   [len: u16 BE][login: UTF-8]
//! client -> server   [len: u16 BE][password: UTF-8]
//! server -> client   [verdict: u8]   0x00 accepted, anything else rejected
//! ```
//!
//! There is no version byte and nothing follows the verdict: once it is
//! read, the stream belongs to the application.

use zeroize::Zeroizing;

use super::{Credential, ProtocolError};

/// Largest field the 16-bit length prefix can describe.
pub const MAX_FIELD_LEN: usize = u16::MAX as usize;

/// Name of the first field, used in error messages.
pub const LOGIN_FIELD: &str = "login";
/// Name of the second field, used in error messages.
pub const PASSWORD_FIELD: &str = "password";
/// Name of the verdict byte, used in error messages.
pub const VERDICT_FIELD: &str = "verdict";

/// Append one length-prefixed UTF-8 field to `out`.
pub fn encode_field(
    field: &'static str,
    value: &str,
    out: &mut Vec<u8>,
) -> Result<(), ProtocolError> {
    let len = u16::try_from(value.len()).map_err(|_| ProtocolError::FieldTooLong {
        field,
        len: value.len(),
    })?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

/// Encode login and password into a single frame.
///
/// Nothing is produced if either field is too long, so a failed encode
/// never leaves half a credential on the wire. The buffer holds the
/// password and is zeroed on drop.
pub fn encode_credential(credential: &Credential) -> Result<Zeroizing<Vec<u8>>, ProtocolError> {
    let mut frame = Zeroizing::new(Vec::with_capacity(
        4 + credential.login().len() + credential.password().len(),
    ));
    encode_field(LOGIN_FIELD, credential.login(), &mut frame)?;
    encode_field(PASSWORD_FIELD, credential.password(), &mut frame)?;
    Ok(frame)
}

/// Decode the body of a field whose length prefix has already been read.
pub fn decode_field(field: &'static str, body: Vec<u8>) -> Result<String, ProtocolError> {
    String::from_utf8(body).map_err(|e| {
        // from_utf8 hands the bytes back on failure; wipe them too.
        let mut rejected = e.into_bytes();
        zeroize::Zeroize::zeroize(&mut rejected);
        ProtocolError::InvalidUtf8 { field }
    })
}
