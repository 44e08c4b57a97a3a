//! The individual checks, one function per expectation.

use anyhow::{ensure, Context, Result};
use std::path::Path;

use super::CheckPlan;
use crate::probe::{self, ProbeResponse};
use crate::session::NO_VALUE;
use crate::site::content_type_for;

const ROOT_BODY: &str = "<html><body>Dyko root</body></html>\n";

type Check = fn(&CheckPlan) -> Result<()>;

pub(super) const ALL: &[(&str, Check)] = &[
    ("notfound", notfound),
    ("hidden_notfound", hidden_notfound),
    ("hidden_static", hidden_static),
    ("hidden_template", hidden_template),
    ("static_notfound", static_notfound),
    ("lipsum_notfound", lipsum_notfound),
    ("index", index),
    ("hello", hello),
    ("hello_redirect", hello_redirect),
    ("lipsum", lipsum),
    ("asset", asset),
    ("asset_etag", asset_etag),
    ("asset_last_modified", asset_last_modified),
    ("asset_etag_and_last_modified", asset_etag_and_last_modified),
    ("asset_head", asset_head),
    ("method_not_allowed", method_not_allowed),
    ("session", session),
];

fn fetch(plan: &CheckPlan, path: &str, headers: &[(&str, &str)]) -> Result<ProbeResponse> {
    probe::get(&plan.url(path), headers)
}

fn expect_status(r: &ProbeResponse, status: u32) -> Result<()> {
    ensure!(r.status == status, "expected {}, got {}", status, r.status);
    Ok(())
}

fn expect_content_type(r: &ProbeResponse, content_type: &str) -> Result<()> {
    let got = r.header("Content-Type").unwrap_or("");
    ensure!(
        got == content_type,
        "expected Content-Type {:?}, got {:?}",
        content_type,
        got
    );
    Ok(())
}

fn expect_not_modified(r: &ProbeResponse) -> Result<()> {
    expect_status(r, 304)?;
    ensure!(r.body.is_empty(), "304 carried {} body bytes", r.body.len());
    Ok(())
}

fn status_of(plan: &CheckPlan, path: &str, status: u32) -> Result<()> {
    expect_status(&fetch(plan, path, &[])?, status)
}

fn notfound(plan: &CheckPlan) -> Result<()> {
    status_of(plan, "/nonexistent", 404)
}

fn hidden_notfound(plan: &CheckPlan) -> Result<()> {
    status_of(plan, "/.hidden_but_nonexistent", 404)
}

fn hidden_static(plan: &CheckPlan) -> Result<()> {
    status_of(plan, "/__logo/.hidden_file", 403)
}

fn hidden_template(plan: &CheckPlan) -> Result<()> {
    status_of(plan, "/.hidden_template", 403)
}

fn static_notfound(plan: &CheckPlan) -> Result<()> {
    status_of(plan, "/__logo/inexistent.png", 404)
}

fn lipsum_notfound(plan: &CheckPlan) -> Result<()> {
    status_of(plan, "/lorem/ipsum/dolor", 404)
}

fn index(plan: &CheckPlan) -> Result<()> {
    let r = fetch(plan, "/", &[])?;
    expect_status(&r, 200)?;
    expect_content_type(&r, "text/html; charset=utf-8")?;
    ensure!(
        r.body_text() == ROOT_BODY,
        "unexpected root body {:?}",
        r.body_text()
    );
    Ok(())
}

fn hello(plan: &CheckPlan) -> Result<()> {
    let r = fetch(plan, "/hello/?name=World", &[])?;
    expect_status(&r, 200)?;
    expect_content_type(&r, "text/html; charset=utf-8")?;
    ensure!(
        r.body_text() == "<html><body>Hello, World!</body></html>\n",
        "unexpected body {:?}",
        r.body_text()
    );
    Ok(())
}

fn hello_redirect(plan: &CheckPlan) -> Result<()> {
    let r = fetch(plan, "/hello?world", &[])?;
    expect_status(&r, 301)?;
    let location = r.header("Location").context("301 without Location")?;
    ensure!(
        location.ends_with("/hello/?world"),
        "Location {:?} does not keep the query string",
        location
    );
    let body = r.body_text();
    ensure!(
        body.to_lowercase().contains("redirect"),
        "redirect body does not mention the redirect"
    );
    ensure!(
        body.contains("hello/?world"),
        "redirect body does not contain the target"
    );
    Ok(())
}

fn lipsum(plan: &CheckPlan) -> Result<()> {
    let r = fetch(plan, "/lorem/ipsum/", &[])?;
    expect_status(&r, 200)?;
    expect_content_type(&r, "text/plain; charset=utf-8")?;
    ensure!(
        r.body_text().contains("Lorem ipsum dolor sit amet"),
        "lorem ipsum text missing"
    );
    Ok(())
}

/// Fetch the asset and return its `(ETag, Last-Modified)`.
fn asset_validators(plan: &CheckPlan) -> Result<(String, String)> {
    let r = fetch(plan, &plan.asset_path, &[])?;
    expect_status(&r, 200)?;
    let etag = r.header("ETag").context("asset without ETag")?;
    let last_modified = r.header("Last-Modified").context("asset without Last-Modified")?;
    Ok((etag.to_string(), last_modified.to_string()))
}

fn asset(plan: &CheckPlan) -> Result<()> {
    let r = fetch(plan, &plan.asset_path, &[])?;
    expect_status(&r, 200)?;
    expect_content_type(&r, content_type_for(Path::new(&plan.asset_path)))?;
    if let Some(expected) = plan.asset_len {
        ensure!(
            r.body.len() == expected,
            "expected {} asset bytes, got {}",
            expected,
            r.body.len()
        );
    }
    if let Some(len) = r.header("Content-Length") {
        ensure!(
            len.parse::<usize>().ok() == Some(r.body.len()),
            "Content-Length {} but {} body bytes",
            len,
            r.body.len()
        );
    }
    Ok(())
}

fn asset_etag(plan: &CheckPlan) -> Result<()> {
    let (etag, _) = asset_validators(plan)?;
    expect_not_modified(&fetch(plan, &plan.asset_path, &[("If-None-Match", &etag)])?)
}

fn asset_last_modified(plan: &CheckPlan) -> Result<()> {
    let (_, last_modified) = asset_validators(plan)?;
    expect_not_modified(&fetch(
        plan,
        &plan.asset_path,
        &[("If-Modified-Since", &last_modified)],
    )?)
}

fn asset_etag_and_last_modified(plan: &CheckPlan) -> Result<()> {
    let (etag, last_modified) = asset_validators(plan)?;
    expect_not_modified(&fetch(
        plan,
        &plan.asset_path,
        &[("If-None-Match", &etag), ("If-Modified-Since", &last_modified)],
    )?)
}

fn asset_head(plan: &CheckPlan) -> Result<()> {
    let get = fetch(plan, &plan.asset_path, &[])?;
    let r = probe::head(&plan.url(&plan.asset_path), &[])?;
    expect_status(&r, 200)?;
    ensure!(r.body.is_empty(), "HEAD carried {} body bytes", r.body.len());
    for name in ["Content-Type", "ETag", "Last-Modified"] {
        ensure!(
            r.header(name) == get.header(name),
            "HEAD {} {:?} differs from GET {:?}",
            name,
            r.header(name),
            get.header(name)
        );
    }
    Ok(())
}

fn method_not_allowed(plan: &CheckPlan) -> Result<()> {
    let r = probe::request("POST", &plan.url("/"), &[])?;
    expect_status(&r, 405)?;
    let allow = r.header("Allow").context("405 without Allow")?;
    ensure!(allow.contains("GET"), "Allow {:?} does not list GET", allow);
    Ok(())
}

fn session(plan: &CheckPlan) -> Result<()> {
    let r1 = fetch(plan, "/session/", &[])?;
    expect_status(&r1, 200)?;
    ensure!(
        r1.body_text() == NO_VALUE,
        "fresh session returned {:?}",
        r1.body_text()
    );

    let r2 = fetch(plan, "/session/?blah", &[])?;
    expect_status(&r2, 200)?;
    let cookie = r2
        .cookie_pair(&plan.session_cookie)
        .context("session write did not set the session cookie")?
        .to_string();

    let r3 = fetch(plan, "/session/", &[("Cookie", &cookie)])?;
    expect_status(&r3, 200)?;
    ensure!(
        r3.body_text() == "blah",
        "session read returned {:?}",
        r3.body_text()
    );
    Ok(())
}
