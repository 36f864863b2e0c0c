//! Async reads and writes of the handshake frames.

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use zeroize::Zeroizing;

use crate::domain::wire::{self, LOGIN_FIELD, PASSWORD_FIELD, VERDICT_FIELD};
use crate::domain::{AuthError, Credential, ProtocolError, Verdict};

/// Client step 1-2: send login and password, then flush.
pub async fn write_credential<W>(writer: &mut W, credential: &Credential) -> Result<(), AuthError>
where
    W: AsyncWrite + Unpin,
{
    let frame = wire::encode_credential(credential)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Server step 2: read login then password.
///
/// Blocks until both fields have arrived. A stream that ends early yields
/// [`ProtocolError::Truncated`].
pub async fn read_credential<R>(reader: &mut R) -> Result<Credential, AuthError>
where
    R: AsyncRead + Unpin,
{
    let login = read_field(reader, LOGIN_FIELD).await?;
    let password = Zeroizing::new(read_field(reader, PASSWORD_FIELD).await?);
    Ok(Credential::new(login, password.as_str()))
}

async fn read_field<R>(reader: &mut R, field: &'static str) -> Result<String, AuthError>
where
    R: AsyncRead + Unpin,
{
    let len = reader
        .read_u16()
        .await
        .map_err(|e| truncated_or_io(e, field))?;
    let mut body = vec![0u8; usize::from(len)];
    if let Err(e) = reader.read_exact(&mut body).await {
        zeroize::Zeroize::zeroize(&mut body);
        return Err(truncated_or_io(e, field));
    }
    Ok(wire::decode_field(field, body)?)
}

/// Server step 4: send the verdict byte, then flush.
pub async fn write_verdict<W>(writer: &mut W, verdict: Verdict) -> Result<(), AuthError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_u8(verdict.to_byte()).await?;
    writer.flush().await?;
    Ok(())
}

/// Client step 5: read the verdict byte.
///
/// A closed or reset stream counts as [`Verdict::Rejected`]; only other
/// transport errors are reported as errors.
pub async fn read_verdict<R>(reader: &mut R) -> Result<Verdict, AuthError>
where
    R: AsyncRead + Unpin,
{
    match reader.read_u8().await {
        Ok(byte) => Ok(Verdict::from_byte(byte)),
        Err(e) if is_stream_closed(&e) => {
            tracing::debug!(field = VERDICT_FIELD, error = %e, "no verdict byte, treating as rejected");
            Ok(Verdict::Rejected)
        }
        Err(e) => Err(e.into()),
    }
}

fn truncated_or_io(err: io::Error, field: &'static str) -> AuthError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        ProtocolError::Truncated { field }.into()
    } else {
        err.into()
    }
}

fn is_stream_closed(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
    )
}
