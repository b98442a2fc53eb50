//! Stat (HEAD) and Get (GET + copy into a sink) against a resource locator.
//!
//! One blocking round trip per call on the calling thread. The status of the
//! final response is known before the first body byte is handed over, so a
//! non-2xx body is drained and never reaches the sink. No retries: every
//! failure goes back to the caller.

use crate::error::TransferError;
use crate::headers::Headers;
use crate::locator::ResourceLocator;
use crate::outcome::{is_success_status, TransferOutcome};
use crate::transport::Transport;
use curl::easy::List;
use std::cell::RefCell;
use std::io::{self, Write};

/// Metadata probe and body retrieval for a remote file.
pub trait RemoteFiler {
    /// HEAD the resource. `Ok` only for a 2xx response.
    fn stat(&self, locator: &ResourceLocator) -> Result<TransferOutcome, TransferError>;

    /// GET the resource and stream the body into `sink`. `Ok` only for a 2xx
    /// response whose body was written in full. On a copy error the sink keeps
    /// whatever was written before the failure.
    fn get(
        &self,
        locator: &ResourceLocator,
        sink: &mut dyn Write,
    ) -> Result<TransferOutcome, TransferError>;
}

/// HTTP implementation of [`RemoteFiler`] over a shared [`Transport`].
#[derive(Debug, Clone, Default)]
pub struct TransferClient {
    transport: Transport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Head,
    Get,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::Head => "HEAD",
            Method::Get => "GET",
        }
    }
}

impl TransferClient {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    fn perform(
        &self,
        method: Method,
        locator: &ResourceLocator,
        sink: &mut dyn Write,
    ) -> Result<TransferOutcome, TransferError> {
        let url = locator.address().as_str();
        let transport_err = |source: curl::Error| TransferError::Transport {
            url: url.to_string(),
            source,
        };

        if !matches!(locator.address().scheme(), "http" | "https") {
            return Err(TransferError::UnsupportedScheme {
                url: url.to_string(),
            });
        }
        let list = header_list(locator.headers())?;

        let mut easy = self.transport.checkout().map_err(transport_err)?;
        easy.url(url).map_err(transport_err)?;
        match method {
            Method::Head => easy.nobody(true).map_err(transport_err)?,
            Method::Get => easy.get(true).map_err(transport_err)?,
        }
        if !locator.headers().is_empty() {
            easy.http_headers(list).map_err(transport_err)?;
        }

        tracing::debug!("{} {} ({} extra headers)", method.as_str(), url, locator.headers().len());

        let exchange = RefCell::new(Exchange::new(self.transport.config().follow_redirects));
        let result = {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| exchange.borrow_mut().on_header(data))
                .map_err(transport_err)?;
            transfer
                .write_function(|data| {
                    let mut ex = exchange.borrow_mut();
                    // Redirect hops and error pages are drained, not copied.
                    if !ex.accepts_body() {
                        return Ok(data.len());
                    }
                    match write_counted(&mut *sink, data, &mut ex.bytes_copied) {
                        Ok(()) => Ok(data.len()),
                        Err(e) => {
                            ex.sink_error = Some(e);
                            Ok(0) // abort transfer
                        }
                    }
                })
                .map_err(transport_err)?;
            transfer.perform()
        };
        let exchange = exchange.into_inner();

        if let Err(source) = result {
            return Err(exchange.into_failure(method, url, source));
        }

        let status = easy.response_code().map_err(transport_err)?;
        let outcome = exchange.into_outcome(status);
        tracing::debug!(
            "{} {} -> HTTP {}, {} bytes copied",
            method.as_str(),
            url,
            outcome.status,
            outcome.bytes_copied
        );

        if !outcome.is_success() {
            return Err(TransferError::Status {
                method: method.as_str(),
                url: url.to_string(),
                outcome: Box::new(outcome),
            });
        }

        if method == Method::Get {
            if let Some(expected) = outcome.content_length() {
                if expected != outcome.bytes_copied {
                    return Err(TransferError::Truncated {
                        url: url.to_string(),
                        expected,
                        outcome: Box::new(outcome),
                    });
                }
            }
        }

        Ok(outcome)
    }
}

impl RemoteFiler for TransferClient {
    fn stat(&self, locator: &ResourceLocator) -> Result<TransferOutcome, TransferError> {
        self.perform(Method::Head, locator, &mut io::sink())
    }

    fn get(
        &self,
        locator: &ResourceLocator,
        sink: &mut dyn Write,
    ) -> Result<TransferOutcome, TransferError> {
        self.perform(Method::Get, locator, sink)
    }
}

/// Response state collected by the curl callbacks during one transfer.
#[derive(Debug)]
struct Exchange {
    follow_redirects: bool,
    status: Option<u32>,
    lines: Vec<String>,
    headers_complete: bool,
    bytes_copied: u64,
    sink_error: Option<io::Error>,
    /// `Location` of a redirect to a scheme other than http/https.
    blocked_redirect: Option<String>,
}

impl Exchange {
    fn new(follow_redirects: bool) -> Self {
        Self {
            follow_redirects,
            status: None,
            lines: Vec::new(),
            headers_complete: false,
            bytes_copied: 0,
            sink_error: None,
            blocked_redirect: None,
        }
    }

    /// Returns false to abort the transfer.
    fn on_header(&mut self, data: &[u8]) -> bool {
        let line = String::from_utf8_lossy(data);
        let line = line.trim_end();
        if line.starts_with("HTTP/") {
            // Each response (1xx, redirect hop, final) starts with a status line.
            self.status = parse_status_line(line);
            self.lines.clear();
            self.headers_complete = false;
        } else if line.is_empty() {
            self.headers_complete = true;
        } else {
            if self.follow_redirects && self.is_redirect() {
                if let Some(target) = location_value(line).filter(|t| !is_http_target(t)) {
                    // libcurl would follow this; redirects obey the same scheme rule as the request.
                    self.blocked_redirect = Some(target.to_string());
                    return false;
                }
            }
            self.lines.push(line.to_string());
        }
        true
    }

    fn is_redirect(&self) -> bool {
        self.status.map(|s| (300..400).contains(&s)).unwrap_or(false)
    }

    /// Status of the final response, once its header block is complete.
    fn final_status(&self) -> Option<u32> {
        let status = self.status.filter(|_| self.headers_complete)?;
        if status < 200 {
            return None;
        }
        let will_follow = self.follow_redirects
            && (300..400).contains(&status)
            && self.lines.iter().any(|l| location_value(l).is_some());
        if will_follow {
            None
        } else {
            Some(status)
        }
    }

    fn accepts_body(&self) -> bool {
        self.final_status().map(is_success_status).unwrap_or(false)
    }

    fn into_outcome(self, status: u32) -> TransferOutcome {
        TransferOutcome {
            status,
            headers: Headers::from_lines(&self.lines),
            bytes_copied: self.bytes_copied,
        }
    }

    /// Map a failed transfer onto the error taxonomy, depending on how far it got.
    fn into_failure(mut self, method: Method, url: &str, source: curl::Error) -> TransferError {
        if let Some(target) = self.blocked_redirect.take() {
            return TransferError::UnsupportedScheme { url: target };
        }
        let url = url.to_string();
        if let Some(io_err) = self.sink_error.take() {
            let status = self.final_status().unwrap_or_default();
            return TransferError::Sink {
                url,
                outcome: Box::new(self.into_outcome(status)),
                source: io_err,
            };
        }
        if source.is_too_many_redirects() {
            // The last hop's 3xx response is complete; report it like any non-2xx answer.
            if let Some(status) = self.status.filter(|_| self.headers_complete) {
                return TransferError::Status {
                    method: method.as_str(),
                    url,
                    outcome: Box::new(self.into_outcome(status)),
                };
            }
        }
        match self.final_status() {
            Some(status) if is_success_status(status) => TransferError::Interrupted {
                url,
                outcome: Box::new(self.into_outcome(status)),
                source,
            },
            Some(status) => TransferError::Status {
                method: method.as_str(),
                url,
                outcome: Box::new(self.into_outcome(status)),
            },
            None => TransferError::Transport { url, source },
        }
    }
}

/// Write all of `data`, counting every byte the sink accepts, including those
/// of a chunk that fails partway.
fn write_counted(sink: &mut dyn Write, data: &[u8], copied: &mut u64) -> io::Result<()> {
    let mut written = 0;
    while written < data.len() {
        match sink.write(&data[written..]) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "sink accepted no bytes",
                ))
            }
            Ok(n) => {
                written += n;
                *copied += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Value of a `Location` header line.
fn location_value(line: &str) -> Option<&str> {
    let (name, value) = line.split_once(':')?;
    name.trim()
        .eq_ignore_ascii_case("location")
        .then(|| value.trim())
}

/// Relative references keep the request's scheme; absolute ones must be http(s).
fn is_http_target(location: &str) -> bool {
    match url::Url::parse(location) {
        Ok(u) => matches!(u.scheme(), "http" | "https"),
        Err(_) => true,
    }
}

/// Status code from `HTTP/1.1 200 OK` or `HTTP/2 404`.
fn parse_status_line(line: &str) -> Option<u32> {
    line.split_whitespace().nth(1)?.parse().ok()
}

/// Request headers as curl header lines, one line per value.
fn header_list(headers: &Headers) -> Result<List, TransferError> {
    let mut list = List::new();
    for (name, value) in headers.iter() {
        if !is_valid_header_name(name) || !is_valid_header_value(value) {
            return Err(TransferError::InvalidHeader {
                name: name.to_string(),
            });
        }
        // "Name:" would tell curl to drop the header; "Name;" sends it empty.
        let line = if value.is_empty() {
            format!("{};", name)
        } else {
            format!("{}: {}", name, value)
        };
        list.append(&line)
            .map_err(|_| TransferError::InvalidHeader {
                name: name.to_string(),
            })?;
    }
    Ok(list)
}

fn is_valid_header_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && b != b':' && b != b';')
}

fn is_valid_header_value(value: &str) -> bool {
    !value.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0)
}
