/*
 * connector_integration.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Bugwire, a Bugzilla client library.
 *
 * Bugwire is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Bugwire is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Bugwire.  If not, see <http://www.gnu.org/licenses/>.
 */


//! Connector against an in-process HTTP server: login state, token and cookie replay on both
//! channels, fault translation and page scraping.

mod common;

use bugwire_core::fault::FaultKind;
use bugwire_core::pages::{BugSearchParser, SearchColumn, SearchLimiter, SearchQuery};
use bugwire_core::rpc::{BugzillaVersion, GetBug, LogIn, LogOut};
use bugwire_core::{BugzillaConnector, BugzillaError};

use common::{
    chunked_response, closed_port_url, http_response, xmlrpc_fault, xmlrpc_ok, xmlrpc_struct,
    MockServer,
};

const LOGIN_RESULT: &str = "<member><name>id</name><value><int>7</int></value></member>\
    <member><name>token</name><value><string>7-Tok3n</string></value></member>";

const OLD_BUG_RESULT: &str = "<member><name>bugs</name><value><array><data><value><struct>\
    <member><name>id</name><value><int>12</int></value></member>\
    <member><name>summary</name><value><string>Crash on start</string></value></member>\
    <member><name>internals</name><value><struct>\
    <member><name>version</name><value><double>42.0</double></value></member>\
    </struct></value></member>\
    </struct></value></data></array></value></member>";

const BUG_LIST_PAGE: &str = "<html>\n<head><title>Bug List</title></head>\n<body>\n\
    <table class=\"bz_buglist\" id=\"buglistSorter\">\n\
    <col class=\"bz_id_column\"><col class=\"bz_delta_ts_column\"><col class=\"bz_short_desc_column\">\n\
    <tr><th>ID</th><th>Changed</th><th>Summary</th></tr>\n\
    <tr><td><a href=\"show_bug.cgi?id=101\">101</a></td>\n\
    <td><span title=\"2017-05-26 13:38:57\">13:38:57</span></td>\n\
    <td>Crash on start</td></tr>\n\
    </table>\n\
    <table id=\"footer\"><tr><td>not part of the list</td></tr></table>\n\
    </body>\n</html>\n";

async fn logged_in(server: &MockServer) -> BugzillaConnector {
    let mut connector = BugzillaConnector::new();
    connector
        .connect(&server.url("bugzilla"), None, None)
        .unwrap();
    let mut login = LogIn::new("alice@example.com", "secret");
    connector.execute_method(&mut login).await.unwrap();
    connector
}

#[tokio::test]
async fn login_then_token_and_cookies_on_later_calls() {
    let server = MockServer::start(vec![
        xmlrpc_ok(
            &[("Set-Cookie", "x=9"), ("Set-Cookie", "Bugzilla_logincookie=abc")],
            &xmlrpc_struct(LOGIN_RESULT),
        ),
        xmlrpc_ok(&[("Set-Cookie", "y=1")], &xmlrpc_struct(OLD_BUG_RESULT)),
    ])
    .await;

    let mut connector = logged_in(&server).await;
    assert_eq!(connector.user(), Some("alice"));
    assert!(connector.has_token());
    assert_eq!(
        connector.cookies(),
        ["x=9".to_string(), "Bugzilla_logincookie=abc".to_string()]
    );

    let mut get = GetBug::new(12);
    connector.execute_method(&mut get).await.unwrap();
    let bug = get.bug().unwrap().unwrap();
    assert_eq!(bug.id(), Some(12));
    assert_eq!(bug.version().as_deref(), Some("42.0"));

    // jar is filled once
    assert_eq!(connector.cookies().len(), 2);

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    let login = &requests[0];
    assert_eq!(login.method, "POST");
    assert_eq!(login.target, "/bugzilla/xmlrpc.cgi");
    assert_eq!(login.header("Content-Type"), Some("text/xml"));
    assert!(login.header("Cookie").is_none());
    assert!(login.header("Authorization").is_none());
    assert!(login.body_text().contains("<methodName>User.login</methodName>"));
    assert!(!login.body_text().contains("Bugzilla_token"));

    let get = &requests[1];
    assert_eq!(get.header("Cookie"), Some("x=9,Bugzilla_logincookie=abc,"));
    let body = get.body_text();
    assert!(body.contains("<methodName>Bug.get</methodName>"));
    assert!(body.contains(
        "<member><name>Bugzilla_token</name><value><string>7-Tok3n</string></value></member>"
    ));
    assert!(body.contains("<member><name>ids</name><value><int>12</int></value></member>"));
}

#[tokio::test]
async fn basic_auth_on_rpc_channel() {
    let server = MockServer::start(vec![xmlrpc_ok(
        &[],
        &xmlrpc_struct("<member><name>version</name><value><string>5.0.4</string></value></member>"),
    )])
    .await;
    let mut connector = BugzillaConnector::new();
    connector
        .connect(&server.url(""), Some("Aladdin"), Some("open sesame"))
        .unwrap();
    let mut version = BugzillaVersion::new();
    connector.execute_method(&mut version).await.unwrap();
    assert_eq!(version.version().as_deref(), Some("5.0.4"));
    assert_eq!(
        server.requests()[0].header("Authorization"),
        Some("Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==")
    );
    assert_eq!(server.requests()[0].target, "/xmlrpc.cgi");
}

#[tokio::test]
async fn fault_becomes_rpc_error() {
    let server = MockServer::start(vec![xmlrpc_ok(
        &[],
        &xmlrpc_fault(300, "The username or password you entered is not valid."),
    )])
    .await;
    let mut connector = BugzillaConnector::new();
    connector.connect(&server.url(""), None, None).unwrap();
    let mut login = LogIn::new("alice@example.com", "wrong");
    let err = connector.execute_method(&mut login).await.unwrap_err();
    match &err {
        BugzillaError::Rpc { code, message } => {
            assert_eq!(*code, Some(300));
            assert_eq!(message, "The username or password you entered is not valid.");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(err.fault_kind(), Some(FaultKind::InvalidCredentials));
    assert!(connector.user().is_none());
    assert!(!connector.has_token());
}

#[tokio::test]
async fn non_struct_result_is_empty() {
    let server = MockServer::start(vec![xmlrpc_ok(
        &[],
        "<methodResponse><params><param><value><string>ok</string></value></param></params></methodResponse>",
    )])
    .await;
    let mut connector = BugzillaConnector::new();
    connector.connect(&server.url(""), None, None).unwrap();
    let mut version = BugzillaVersion::new();
    connector.execute_method(&mut version).await.unwrap();
    assert!(version.version().is_none());
}

#[tokio::test]
async fn server_error_and_refused_connection_are_rpc_errors() {
    let server = MockServer::start(vec![http_response(
        "500 Internal Server Error",
        &[],
        "oops",
    )])
    .await;
    let mut connector = BugzillaConnector::new();
    connector.connect(&server.url(""), None, None).unwrap();
    let err = connector.execute_method(&mut LogOut::new()).await.unwrap_err();
    assert!(matches!(err, BugzillaError::Rpc { code: None, .. }));

    let mut connector = BugzillaConnector::new();
    connector.connect(&closed_port_url().await, None, None).unwrap();
    let err = connector
        .execute_method(&mut BugzillaVersion::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BugzillaError::Rpc { code: None, .. }));
}

#[tokio::test]
async fn cookies_survive_reconnect() {
    let server = MockServer::start(vec![
        xmlrpc_ok(&[("Set-Cookie", "a=1")], &xmlrpc_struct(LOGIN_RESULT)),
        xmlrpc_ok(&[], &xmlrpc_struct("")),
    ])
    .await;
    let mut connector = logged_in(&server).await;
    connector.connect(&server.url("bugzilla/"), None, None).unwrap();
    assert_eq!(connector.cookies(), ["a=1".to_string()]);
    connector.execute_method(&mut LogOut::new()).await.unwrap();
    let logout = &server.requests()[1];
    assert_eq!(logout.header("Cookie"), Some("a=1,"));
    assert!(logout.body_text().contains("Bugzilla_token"));
}

#[tokio::test]
async fn page_request_replays_cookies_and_parses_fragment() {
    let server = MockServer::start(vec![
        xmlrpc_ok(
            &[("Set-Cookie", "a=1"), ("Set-Cookie", "b=2")],
            &xmlrpc_struct(LOGIN_RESULT),
        ),
        chunked_response("200 OK", BUG_LIST_PAGE, 37),
    ])
    .await;
    let mut connector = logged_in(&server).await;

    let mut parser = BugSearchParser::new([
        SearchQuery::new(SearchLimiter::AssignedTo, "alice@example.com"),
        SearchQuery::new(SearchLimiter::BugStatus, "NEW"),
    ])
    .unwrap();
    parser
        .set_search_columns(&[SearchColumn::LastUpdate, SearchColumn::Summary])
        .unwrap();
    connector.execute_http_request(&mut parser).await.unwrap();

    let bugs = parser.results();
    assert_eq!(bugs.len(), 1);
    assert_eq!(bugs[0].id(), Some("101"));
    assert_eq!(bugs[0].get("ShortDesc"), Some("Crash on start"));
    assert!(bugs[0].delta_ts().is_some());

    let page = &server.requests()[1];
    assert_eq!(page.method, "GET");
    assert_eq!(page.header("Cookie"), Some("a=1; b=2;"));
    assert!(page.target.starts_with("/bugzilla/buglist.cgi?"));
    assert!(page.target.contains("query_format=advanced"));
    assert!(page.target.contains("email1=alice%40example.com"));
    assert!(page.target.contains("columnlist=delta_ts%2Cshort_desc"));
    assert!(page.header("Authorization").is_none());
}

#[tokio::test]
async fn page_request_without_cookies_sends_empty_header() {
    let server = MockServer::start(vec![http_response("200 OK", &[], BUG_LIST_PAGE)]).await;
    let mut connector = BugzillaConnector::new();
    connector.connect(&server.url(""), None, None).unwrap();
    let mut parser =
        BugSearchParser::new([SearchQuery::new(SearchLimiter::BugStatus, "NEW")]).unwrap();
    connector.execute_http_request(&mut parser).await.unwrap();
    assert_eq!(parser.results().len(), 1);
    assert_eq!(server.requests()[0].header("Cookie"), Some(""));
}

#[tokio::test]
async fn page_failures_are_http_errors() {
    let truncated = "<html>\n<table id=\"buglistSorter\">\n<tr><td>1</td></tr>\n";
    let server = MockServer::start(vec![
        http_response("200 OK", &[], truncated),
        http_response("200 OK", &[], "<html>\n<p>Zarro Boogs found.</p>\n</html>\n"),
        http_response("404 Not Found", &[], "missing"),
    ])
    .await;
    let mut connector = BugzillaConnector::new();
    connector.connect(&server.url(""), None, None).unwrap();
    for _ in 0..3 {
        let mut parser =
            BugSearchParser::new([SearchQuery::new(SearchLimiter::BugStatus, "NEW")]).unwrap();
        let err = connector.execute_http_request(&mut parser).await.unwrap_err();
        assert!(matches!(err, BugzillaError::Http(_)), "{:?}", err);
        assert!(parser.results().is_empty());
    }
}

#[tokio::test]
async fn page_redirect_is_followed() {
    let server = MockServer::start(vec![
        http_response(
            "302 Found",
            &[("Location", "/bugzilla/buglist.cgi?moved=1")],
            "",
        ),
        http_response("200 OK", &[], BUG_LIST_PAGE),
    ])
    .await;
    let mut connector = BugzillaConnector::new();
    connector.connect(&server.url("bugzilla/"), None, None).unwrap();
    let mut parser =
        BugSearchParser::new([SearchQuery::new(SearchLimiter::BugStatus, "NEW")]).unwrap();
    connector.execute_http_request(&mut parser).await.unwrap();
    assert_eq!(parser.results().len(), 1);

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].target.starts_with("/bugzilla/buglist.cgi?"));
    assert_eq!(requests[1].target, "/bugzilla/buglist.cgi?moved=1");
    assert_eq!(requests[1].header("Cookie"), Some(""));
}

#[tokio::test]
async fn redirect_loops_and_scheme_changes_are_http_errors() {
    let hop = http_response("301 Moved Permanently", &[("Location", "/loop")], "");
    let server = MockServer::start(vec![hop; 6]).await;
    let mut connector = BugzillaConnector::new();
    connector.connect(&server.url(""), None, None).unwrap();
    let mut parser =
        BugSearchParser::new([SearchQuery::new(SearchLimiter::BugStatus, "NEW")]).unwrap();
    let err = connector.execute_http_request(&mut parser).await.unwrap_err();
    assert!(matches!(err, BugzillaError::Http(_)), "{:?}", err);
    assert_eq!(server.requests().len(), 6);

    let server = MockServer::start(vec![http_response(
        "302 Found",
        &[("Location", "https://bugs.example.org/buglist.cgi")],
        "",
    )])
    .await;
    connector.connect(&server.url(""), None, None).unwrap();
    let err = connector.execute_http_request(&mut parser).await.unwrap_err();
    assert!(matches!(err, BugzillaError::Http(_)), "{:?}", err);
    assert_eq!(server.requests().len(), 1);
}
