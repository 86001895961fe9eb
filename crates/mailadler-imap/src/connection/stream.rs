//! TLS stream setup.

use std::sync::Arc;

use rustls::client::WebPkiServerVerifier;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use super::{CertificatePolicy, Config};
use crate::Result;

/// An established implicit-TLS connection.
pub type ImapStream = TlsStream<TcpStream>;

/// Creates a TLS connector for `policy` with the web PKI root certificates.
///
/// # Errors
///
/// Returns [`Error::Tls`](crate::Error::Tls) if the certificate verifier
/// cannot be built.
pub fn create_tls_connector(policy: CertificatePolicy) -> Result<TlsConnector> {
    let config = match policy {
        CertificatePolicy::Verify => rustls::ClientConfig::builder()
            .with_root_certificates(root_store())
            .with_no_client_auth(),
        CertificatePolicy::AcceptInvalid => rustls::ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptInvalidCerts {
                inner: web_pki_verifier()?,
            }))
            .with_no_client_auth(),
    };

    Ok(TlsConnector::from(Arc::new(config)))
}

fn root_store() -> Arc<rustls::RootCertStore> {
    Arc::new(rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    })
}

/// The verifier `Verify` uses, against the bundled roots.
fn web_pki_verifier() -> Result<Arc<WebPkiServerVerifier>> {
    WebPkiServerVerifier::builder(root_store())
        .build()
        .map_err(|e| rustls::Error::General(e.to_string()).into())
}

/// Connects to `config.host:config.port` and performs the TLS handshake.
///
/// # Errors
///
/// Returns an error if the host is not a valid server name, the TCP
/// connection fails, or the handshake fails.
pub async fn connect_tls(config: &Config) -> Result<ImapStream> {
    let connector = create_tls_connector(config.certificate_policy)?;
    let server_name = ServerName::try_from(config.host.clone())?;

    let tcp = TcpStream::connect((config.host.as_str(), config.port)).await?;
    tracing::debug!(host = %config.host, port = config.port, "TCP connected, starting TLS");

    let tls = connector.connect(server_name, tcp).await?;
    Ok(tls)
}

/// Runs the normal web PKI checks but only logs their failures.
///
/// Handshake signatures are still verified, so the peer must own the key of
/// the certificate it presents.
#[derive(Debug)]
struct AcceptInvalidCerts {
    inner: Arc<WebPkiServerVerifier>,
}

impl ServerCertVerifier for AcceptInvalidCerts {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        if let Err(err) =
            self.inner
                .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
        {
            tracing::warn!(server = ?server_name, %err, "ignoring TLS certificate error");
        }
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}
