//! The redirect loop: request, receive, inspect, then follow or stop.
//!
//! # Design
//! `RedirectClient` owns a `Transport` and the `Limits`, and carries no state
//! between runs. Each hop owns its response buffer and drops it before the
//! next hop starts. Only a `3xx` status with a `Location` starting with
//! `http://` is followed; every other response ends the run successfully,
//! whatever its status. Every error ends the run.

use std::io::Write;

use log::{debug, info};

use crate::error::ClientError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{Limits, Param};
use crate::url::{is_absolute_http, ParsedUrl};

/// Where the loop is: the URL to request next and how many redirects led there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectState {
    pub current_url: String,
    pub hop_count: usize,
}

impl RedirectState {
    pub fn new(url: &str) -> Self {
        Self {
            current_url: url.to_string(),
            hop_count: 0,
        }
    }

    fn follow(&mut self, location: String) {
        self.current_url = location;
        self.hop_count += 1;
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Every URL requested, in order. The last entry produced the final response.
    pub chain: Vec<String>,
    pub redirects: usize,
    /// Status of the final response, if it had a recognisable status line.
    pub status: Option<u16>,
}

impl Outcome {
    pub fn final_url(&self) -> Option<&str> {
        self.chain.last().map(String::as_str)
    }
}

pub struct RedirectClient<T> {
    transport: T,
    limits: Limits,
}

impl<T: Transport> RedirectClient<T> {
    pub fn new(transport: T, limits: Limits) -> Self {
        Self { transport, limits }
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Fetch `url` with `params`, following redirects.
    ///
    /// For every hop, writes the request text and its length to `out`, then the
    /// raw response and its byte count. The hop guard trips only once the
    /// counter exceeds `max_redirects`, so up to `max_redirects + 1` requests
    /// are made before `TooManyRedirects`.
    pub fn run<W: Write>(
        &mut self,
        url: &str,
        params: &[Param],
        out: &mut W,
    ) -> Result<Outcome, ClientError> {
        let mut state = RedirectState::new(url);
        let mut chain = Vec::new();

        loop {
            if state.hop_count > self.limits.max_redirects {
                return Err(ClientError::TooManyRedirects {
                    attempts: state.hop_count,
                });
            }

            chain.push(state.current_url.clone());
            let response = self.attempt(&state.current_url, params, out)?;
            let status = response.status_code();

            match self.redirect_target(&response) {
                Some(location) => {
                    drop(response);
                    state.follow(location);
                }
                None => {
                    debug!("done after {} redirects with status {status:?}", state.hop_count);
                    return Ok(Outcome {
                        chain,
                        redirects: state.hop_count,
                        status,
                    });
                }
            }
        }
    }

    /// One hop: parse, build, echo, exchange, print.
    fn attempt<W: Write>(
        &mut self,
        url: &str,
        params: &[Param],
        out: &mut W,
    ) -> Result<HttpResponse, ClientError> {
        let target = ParsedUrl::parse(url, &self.limits)?;
        debug!("target {}:{} path {}", target.host, target.port, target.path);

        let request = HttpRequest::get(&target.host, &target.path, params, &self.limits)?;
        write!(out, "HTTP request =\n{request}\nLEN = {}\n", request.len())
            .and_then(|()| out.flush())
            .map_err(ClientError::Output)?;

        let response = self.transport.exchange(&target, &request)?;

        out.write_all(response.as_bytes())
            .and_then(|()| write!(out, "\n Total received response bytes: {}\n", response.len()))
            .and_then(|()| out.flush())
            .map_err(ClientError::Output)?;
        Ok(response)
    }

    /// Absolute `http://` location of a `3xx` response, if any.
    ///
    /// A location that is not valid UTF-8 is not followed: it cannot be
    /// requested without changing its bytes.
    fn redirect_target(&self, response: &HttpResponse) -> Option<String> {
        let status = response
            .status_code()
            .filter(|code| (300..400).contains(code))?;
        let raw = response.location(&self.limits)?;
        let location = match String::from_utf8(raw) {
            Ok(location) => location,
            Err(e) => {
                debug!("not following non-UTF-8 location {:?}", e.as_bytes());
                return None;
            }
        };
        if !is_absolute_http(&location) {
            debug!("not following non-absolute location {location:?}");
            return None;
        }
        info!("{status} redirect to {location}");
        Some(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    /// Replays canned responses and records every target it was asked for.
    #[derive(Default)]
    struct Scripted {
        responses: VecDeque<Vec<u8>>,
        seen: Vec<(ParsedUrl, String)>,
    }

    impl Scripted {
        fn new<I: IntoIterator<Item = Vec<u8>>>(responses: I) -> Self {
            Self {
                responses: responses.into_iter().collect(),
                seen: Vec::new(),
            }
        }
    }

    impl Transport for Scripted {
        fn exchange(
            &mut self,
            target: &ParsedUrl,
            request: &HttpRequest,
        ) -> Result<HttpResponse, ClientError> {
            self.seen.push((target.clone(), request.to_string()));
            self.responses
                .pop_front()
                .map(HttpResponse::new)
                .ok_or_else(|| ClientError::Receive(io::Error::from(io::ErrorKind::UnexpectedEof)))
        }
    }

    fn redirect(status: u16, location: &str) -> Vec<u8> {
        format!("HTTP/1.1 {status} Found\r\nLocation: {location}\r\n\r\n").into_bytes()
    }

    fn ok(body: &str) -> Vec<u8> {
        format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{body}", body.len()).into_bytes()
    }

    fn client(script: Scripted) -> RedirectClient<Scripted> {
        RedirectClient::new(script, Limits::default())
    }

    #[test]
    fn single_hop_prints_request_and_response() {
        let mut c = client(Scripted::new([ok("ok")]));
        let params: Vec<Param> = vec!["q=hello".parse().unwrap()];
        let mut out = Vec::new();

        let outcome = c.run("http://localhost:8080/search", &params, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let request = "GET /search?q=hello HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let response = ok("ok");
        let expected = format!(
            "HTTP request =\n{request}\nLEN = {}\n{}\n Total received response bytes: {}\n",
            request.len(),
            String::from_utf8(response.clone()).unwrap(),
            response.len()
        );
        assert_eq!(text, expected);
        assert_eq!(outcome.status, Some(200));
        assert_eq!(outcome.redirects, 0);

        let seen = c.into_transport().seen;
        assert_eq!(seen[0].0.port, 8080);
    }

    #[test]
    fn follows_absolute_redirects_and_keeps_params() {
        let mut c = client(Scripted::new([
            redirect(301, "http://b.example/two"),
            redirect(307, "http://c.example:81/three?x=1"),
            ok("done"),
        ]));
        let params: Vec<Param> = vec!["k=v".parse().unwrap()];

        let outcome = c.run("http://a.example/one", &params, &mut io::sink()).unwrap();

        assert_eq!(outcome.redirects, 2);
        assert_eq!(
            outcome.chain,
            ["http://a.example/one", "http://b.example/two", "http://c.example:81/three?x=1"]
        );
        assert_eq!(outcome.final_url(), Some("http://c.example:81/three?x=1"));
        let seen = c.into_transport().seen;
        assert!(seen[2].1.starts_with("GET /three?x=1&k=v HTTP/1.1\r\nHost: c.example\r\n"));
        assert_eq!(seen[2].0.port, 81);
    }

    #[test]
    fn eleventh_redirect_trips_the_guard() {
        let script = Scripted::new((0..12).map(|i| redirect(302, &format!("http://h/{i}"))));
        let mut c = client(script);

        let err = c.run("http://h/start", &[], &mut io::sink()).unwrap_err();

        assert!(matches!(err, ClientError::TooManyRedirects { attempts: 11 }));
        let transport = c.into_transport();
        assert_eq!(transport.seen.len(), 11);
        assert_eq!(transport.responses.len(), 1, "a 12th attempt must never happen");
    }

    #[test]
    fn ten_redirects_then_success_is_allowed() {
        let mut responses: Vec<Vec<u8>> =
            (0..10).map(|i| redirect(302, &format!("http://h/{i}"))).collect();
        responses.push(ok("finally"));
        let mut c = client(Scripted::new(responses));

        let outcome = c.run("http://h/start", &[], &mut io::sink()).unwrap();

        assert_eq!(outcome.redirects, 10);
        assert_eq!(outcome.chain.len(), 11);
        assert_eq!(outcome.status, Some(200));
    }

    #[test]
    fn relative_location_is_not_followed() {
        let mut c = client(Scripted::new([redirect(302, "/elsewhere"), ok("unused")]));

        let outcome = c.run("http://h/", &[], &mut io::sink()).unwrap();

        assert_eq!(outcome.redirects, 0);
        assert_eq!(outcome.status, Some(302));
        assert_eq!(c.into_transport().seen.len(), 1);
    }

    #[test]
    fn redirect_without_location_is_done() {
        let mut c = client(Scripted::new([b"HTTP/1.1 303 See Other\r\n\r\n".to_vec()]));
        let outcome = c.run("http://h/", &[], &mut io::sink()).unwrap();
        assert_eq!(outcome.status, Some(303));
        assert_eq!(outcome.redirects, 0);
    }

    #[test]
    fn location_outside_3xx_is_ignored() {
        let mut c = client(Scripted::new([
            b"HTTP/1.1 201 Created\r\nLocation: http://h/new\r\n\r\n".to_vec(),
        ]));
        let outcome = c.run("http://h/", &[], &mut io::sink()).unwrap();
        assert_eq!(outcome.chain.len(), 1);
    }

    #[test]
    fn error_status_is_still_success() {
        let mut c = client(Scripted::new([b"HTTP/1.1 404 Not Found\r\n\r\nnope".to_vec()]));
        let outcome = c.run("http://h/", &[], &mut io::sink()).unwrap();
        assert_eq!(outcome.status, Some(404));
    }

    #[test]
    fn response_without_status_line_is_done() {
        let mut out = Vec::new();
        let mut c = client(Scripted::new([b"ok".to_vec()]));
        let outcome = c.run("http://h/", &[], &mut out).unwrap();
        assert_eq!(outcome.status, None);
        assert!(String::from_utf8(out)
            .unwrap()
            .ends_with("ok\n Total received response bytes: 2\n"));
    }

    #[test]
    fn non_utf8_location_ends_the_run_untouched() {
        let mut response = b"HTTP/1.1 302 Found\r\nLocation: http://h/caf".to_vec();
        response.extend_from_slice(b"\xE9\r\n\r\n");
        let mut c = client(Scripted::new([response, ok("unused")]));

        let outcome = c.run("http://h/", &[], &mut io::sink()).unwrap();

        assert_eq!(outcome.status, Some(302));
        assert_eq!(outcome.redirects, 0);
        let seen = c.into_transport().seen;
        assert_eq!(seen.len(), 1, "no request for a rewritten location");
    }

    #[test]
    fn oversized_request_sends_and_prints_nothing() {
        let params: Vec<Param> = (0..120)
            .map(|i| format!("param{i:03}=value{i:06}").parse().unwrap())
            .collect();
        let mut out = Vec::new();
        let mut c = client(Scripted::new([ok("unused")]));

        let err = c.run("http://h/", &params, &mut out).unwrap_err();

        assert!(matches!(err, ClientError::RequestTooLarge { capacity: 2048, .. }));
        assert!(out.is_empty());
        assert!(c.into_transport().seen.is_empty());
    }

    #[test]
    fn oversized_request_on_redirect_hop_aborts() {
        let long_path = format!("http://h/{}", "a".repeat(1000));
        let params: Vec<Param> = vec![format!("q={}", "b".repeat(1100)).parse().unwrap()];
        let mut out = Vec::new();
        let mut c = client(Scripted::new([redirect(302, &long_path), ok("unused")]));

        let err = c.run("http://h/", &params, &mut out).unwrap_err();

        assert!(matches!(err, ClientError::RequestTooLarge { .. }));
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches("HTTP request =\n").count(), 1);
        let transport = c.into_transport();
        assert_eq!(transport.seen.len(), 1);
        assert_eq!(transport.responses.len(), 1);
    }

    #[test]
    fn malformed_redirect_target_fails_the_run() {
        let mut c = client(Scripted::new([redirect(302, "http://:99/")]));
        let err = c.run("http://h/", &[], &mut io::sink()).unwrap_err();
        assert!(matches!(err, ClientError::MalformedUrl(_)));
    }

    #[test]
    fn malformed_start_url_sends_nothing() {
        let mut out = Vec::new();
        let mut c = client(Scripted::new([ok("unused")]));
        let err = c.run("http://host:abc/", &[], &mut out).unwrap_err();
        assert!(matches!(err, ClientError::MalformedUrl(_)));
        assert!(out.is_empty());
        assert!(c.into_transport().seen.is_empty());
    }

    #[test]
    fn transport_failure_after_echo_aborts() {
        let mut out = Vec::new();
        let mut c = client(Scripted::default());
        let err = c.run("http://h/", &[], &mut out).unwrap_err();
        assert!(matches!(err, ClientError::Receive(_)));
        assert!(String::from_utf8(out).unwrap().starts_with("HTTP request =\nGET / HTTP/1.1"));
    }
}
