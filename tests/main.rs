use lanftp::auth::{AuthError, Authenticator, Permissions, UserAccount};
use pretty_assertions::assert_eq;
use std::net::SocketAddrV4;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    /// Connects and consumes the greeting, retrying until the server is up.
    async fn connect(addr: &str) -> Client {
        let mut client = Client::connect_raw(addr).await;
        let greeting = client.read_reply().await;
        assert!(greeting.starts_with("220 "), "unexpected greeting: {greeting}");
        client
    }

    async fn connect_raw(addr: &str) -> Client {
        for _ in 0..50 {
            if let Ok(stream) = TcpStream::connect(addr).await {
                let (reader, writer) = stream.into_split();
                return Client {
                    reader: BufReader::new(reader),
                    writer,
                };
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("server at {addr} never came up");
    }

    async fn cmd(&mut self, line: &str) -> String {
        self.writer.write_all(format!("{line}\r\n").as_bytes()).await.unwrap();
        self.read_reply().await
    }

    async fn read_reply(&mut self) -> String {
        let mut reply = String::new();
        self.reader.read_line(&mut reply).await.unwrap();
        if reply.len() >= 4 && reply.as_bytes()[3] == b'-' {
            let terminator = format!("{} ", &reply[..3]);
            loop {
                let mut line = String::new();
                self.reader.read_line(&mut line).await.unwrap();
                let done = line.starts_with(&terminator);
                reply.push_str(&line);
                if done {
                    break;
                }
            }
        }
        reply
    }

    async fn login(&mut self, username: &str, password: &str) {
        let reply = self.cmd(&format!("USER {username}")).await;
        assert!(reply.starts_with("331"), "expected 331, got: {reply}");
        let reply = self.cmd(&format!("PASS {password}")).await;
        assert!(reply.starts_with("230"), "expected 230, got: {reply}");
    }

    async fn login_anonymous(&mut self) {
        let reply = self.cmd("USER anonymous").await;
        assert!(reply.starts_with("230"), "expected 230, got: {reply}");
    }

    /// Issues PASV and parses the address out of the 227 reply.
    async fn pasv(&mut self) -> SocketAddrV4 {
        let reply = self.cmd("PASV").await;
        assert!(reply.starts_with("227"), "expected 227, got: {reply}");
        let start = reply.find('(').unwrap();
        let end = reply.find(')').unwrap();
        let nums: Vec<u16> = reply[start + 1..end].split(',').map(|n| n.parse().unwrap()).collect();
        assert_eq!(nums.len(), 6);
        let ip = std::net::Ipv4Addr::new(nums[0] as u8, nums[1] as u8, nums[2] as u8, nums[3] as u8);
        SocketAddrV4::new(ip, nums[4] * 256 + nums[5])
    }
}

fn spawn_server(addr: &'static str, root: &Path) {
    let server = lanftp::Server::with_root(root).greeting("Welcome test");
    tokio::spawn(server.listen(addr));
}

#[tokio::test]
async fn connect_and_quit() {
    let root = tempfile::tempdir().unwrap();
    spawn_server("127.0.0.1:2121", root.path());

    let mut client = Client::connect("127.0.0.1:2121").await;
    let reply = client.cmd("QUIT").await;
    assert!(reply.starts_with("221"), "expected 221, got: {reply}");
}

#[tokio::test]
async fn login_with_credentials() {
    let root = tempfile::tempdir().unwrap();
    let server = lanftp::Server::with_root(root.path()).credentials("kas", "secret");
    tokio::spawn(server.listen("127.0.0.1:2122"));

    let mut client = Client::connect("127.0.0.1:2122").await;
    client.login("kas", "secret").await;
    let reply = client.cmd("SYST").await;
    assert_eq!(reply, "215 UNIX Type: L8\r\n");
}

#[tokio::test]
async fn wrong_password_is_refused() {
    let root = tempfile::tempdir().unwrap();
    let server = lanftp::Server::with_root(root.path()).credentials("kas", "secret");
    tokio::spawn(server.listen("127.0.0.1:2123"));

    let mut client = Client::connect("127.0.0.1:2123").await;
    let reply = client.cmd("USER kas").await;
    assert!(reply.starts_with("331"), "got: {reply}");
    let reply = client.cmd("PASS nope").await;
    assert!(reply.starts_with("530"), "got: {reply}");

    // An empty password is a real (failing) attempt, not a protocol error.
    let reply = client.cmd("USER kas").await;
    assert!(reply.starts_with("331"), "got: {reply}");
    let reply = client.cmd("PASS").await;
    assert!(reply.starts_with("530"), "got: {reply}");

    // A failed attempt does not poison the session.
    client.login("kas", "secret").await;
}

#[tokio::test]
async fn anonymous_refused_when_credentials_are_set() {
    let root = tempfile::tempdir().unwrap();
    let server = lanftp::Server::with_root(root.path()).credentials("kas", "secret");
    tokio::spawn(server.listen("127.0.0.1:2124"));

    let mut client = Client::connect("127.0.0.1:2124").await;
    let reply = client.cmd("USER anonymous").await;
    assert!(reply.starts_with("331"), "got: {reply}");
    let reply = client.cmd("PASS whatever").await;
    assert!(reply.starts_with("530"), "got: {reply}");
}

#[tokio::test]
async fn commands_require_login() {
    let root = tempfile::tempdir().unwrap();
    spawn_server("127.0.0.1:2125", root.path());

    let mut client = Client::connect("127.0.0.1:2125").await;
    for cmd in ["PWD", "SYST", "LIST", "STOR x", "RETR x", "PASV"] {
        let reply = client.cmd(cmd).await;
        assert!(reply.starts_with("530"), "{cmd} before login got: {reply}");
    }
    // NOOP and FEAT are fine without logging in.
    let reply = client.cmd("NOOP").await;
    assert!(reply.starts_with("200"), "got: {reply}");
    let reply = client.cmd("FEAT").await;
    assert!(reply.starts_with("211-"), "got: {reply}");
}

#[tokio::test]
async fn anonymous_pasv_list() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("hello.txt"), b"hello\n").unwrap();
    spawn_server("127.0.0.1:2126", root.path());

    let mut client = Client::connect("127.0.0.1:2126").await;
    client.login_anonymous().await;

    let reply = client.cmd("PWD").await;
    assert!(reply.starts_with("257 \"/\""), "got: {reply}");

    let data_addr = client.pasv().await;
    let mut data = TcpStream::connect(data_addr).await.unwrap();
    let reply = client.cmd("LIST").await;
    assert!(reply.starts_with("150"), "got: {reply}");
    let mut listing = String::new();
    data.read_to_string(&mut listing).await.unwrap();
    assert!(listing.contains("hello.txt"), "listing was: {listing}");
    let reply = client.read_reply().await;
    assert!(reply.starts_with("226"), "got: {reply}");

    // PWD is idempotent, data channels are not.
    let reply = client.cmd("PWD").await;
    assert!(reply.starts_with("257 \"/\""), "got: {reply}");
    let reply = client.cmd("LIST").await;
    assert!(reply.starts_with("425"), "got: {reply}");
}

#[tokio::test]
async fn stor_without_data_connection() {
    let root = tempfile::tempdir().unwrap();
    spawn_server("127.0.0.1:2127", root.path());

    let mut client = Client::connect("127.0.0.1:2127").await;
    client.login_anonymous().await;
    let reply = client.cmd("STOR upload.bin").await;
    assert!(reply.starts_with("425"), "got: {reply}");
}

#[tokio::test]
async fn paths_cannot_leave_the_root() {
    let root = tempfile::tempdir().unwrap();
    spawn_server("127.0.0.1:2128", root.path());

    let mut client = Client::connect("127.0.0.1:2128").await;
    client.login_anonymous().await;
    let reply = client.cmd("RETR ../outside.txt").await;
    assert!(reply.starts_with("550"), "got: {reply}");
    let reply = client.cmd("CWD ../../etc").await;
    assert!(reply.starts_with("550"), "got: {reply}");
    let reply = client.cmd("DELE /../secret").await;
    assert!(reply.starts_with("550"), "got: {reply}");
}

#[tokio::test]
async fn binary_upload_download_roundtrip() {
    let root = tempfile::tempdir().unwrap();
    spawn_server("127.0.0.1:2129", root.path());

    let payload: Vec<u8> = (0..u8::MAX).cycle().take(64 * 1024 + 13).collect();

    let mut client = Client::connect("127.0.0.1:2129").await;
    client.login_anonymous().await;
    let reply = client.cmd("TYPE I").await;
    assert!(reply.starts_with("200"), "got: {reply}");

    let data_addr = client.pasv().await;
    let mut data = TcpStream::connect(data_addr).await.unwrap();
    let reply = client.cmd("STOR blob.bin").await;
    assert!(reply.starts_with("150"), "got: {reply}");
    data.write_all(&payload).await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);
    let reply = client.read_reply().await;
    assert!(reply.starts_with("226"), "got: {reply}");

    assert_eq!(std::fs::read(root.path().join("blob.bin")).unwrap(), payload);

    let data_addr = client.pasv().await;
    let mut data = TcpStream::connect(data_addr).await.unwrap();
    let reply = client.cmd("RETR blob.bin").await;
    assert!(reply.starts_with("150"), "got: {reply}");
    let mut downloaded = Vec::new();
    data.read_to_end(&mut downloaded).await.unwrap();
    assert_eq!(downloaded, payload);
    let reply = client.read_reply().await;
    assert!(reply.starts_with("226"), "got: {reply}");
}

#[tokio::test]
async fn rest_resumes_a_download() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("alpha.txt"), b"abcdefgh").unwrap();
    spawn_server("127.0.0.1:2130", root.path());

    let mut client = Client::connect("127.0.0.1:2130").await;
    client.login_anonymous().await;
    client.cmd("TYPE I").await;

    let data_addr = client.pasv().await;
    let mut data = TcpStream::connect(data_addr).await.unwrap();
    let reply = client.cmd("REST 4").await;
    assert!(reply.starts_with("350"), "got: {reply}");
    let reply = client.cmd("RETR alpha.txt").await;
    assert!(reply.starts_with("150"), "got: {reply}");
    let mut tail = Vec::new();
    data.read_to_end(&mut tail).await.unwrap();
    assert_eq!(tail, b"efgh");
    let reply = client.read_reply().await;
    assert!(reply.starts_with("226"), "got: {reply}");

    // The restart offset applies to one transfer only.
    let data_addr = client.pasv().await;
    let mut data = TcpStream::connect(data_addr).await.unwrap();
    let reply = client.cmd("RETR alpha.txt").await;
    assert!(reply.starts_with("150"), "got: {reply}");
    let mut full = Vec::new();
    data.read_to_end(&mut full).await.unwrap();
    assert_eq!(full, b"abcdefgh");
    client.read_reply().await;
}

#[tokio::test]
async fn directories_and_renames() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("hello.txt"), b"hi").unwrap();
    spawn_server("127.0.0.1:2131", root.path());

    let mut client = Client::connect("127.0.0.1:2131").await;
    client.login_anonymous().await;

    let reply = client.cmd("MKD sub").await;
    assert!(reply.starts_with("257"), "got: {reply}");
    let reply = client.cmd("CWD sub").await;
    assert!(reply.starts_with("250"), "got: {reply}");
    let reply = client.cmd("PWD").await;
    assert!(reply.starts_with("257 \"/sub\""), "got: {reply}");
    let reply = client.cmd("CDUP").await;
    assert!(reply.starts_with("250"), "got: {reply}");

    let reply = client.cmd("RNFR hello.txt").await;
    assert!(reply.starts_with("350"), "got: {reply}");
    let reply = client.cmd("RNTO sub/renamed.txt").await;
    assert!(reply.starts_with("250"), "got: {reply}");
    assert!(root.path().join("sub/renamed.txt").exists());

    // RNTO out of order gets a 503.
    let reply = client.cmd("RNTO stray.txt").await;
    assert!(reply.starts_with("503"), "got: {reply}");

    let reply = client.cmd("DELE sub/renamed.txt").await;
    assert!(reply.starts_with("250"), "got: {reply}");
    let reply = client.cmd("RMD sub").await;
    assert!(reply.starts_with("250"), "got: {reply}");
    assert!(!root.path().join("sub").exists());
}

#[tokio::test]
async fn mdtm_and_mfmt() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("stamp.txt"), b"x").unwrap();
    spawn_server("127.0.0.1:2132", root.path());

    let mut client = Client::connect("127.0.0.1:2132").await;
    client.login_anonymous().await;

    let reply = client.cmd("MDTM stamp.txt").await;
    assert!(reply.starts_with("213 "), "got: {reply}");
    assert_eq!(reply.trim_end().len(), "213 ".len() + 14);

    let reply = client.cmd("MFMT 20240101010101 stamp.txt").await;
    assert!(reply.starts_with("213"), "got: {reply}");
    let reply = client.cmd("MDTM stamp.txt").await;
    assert_eq!(reply, "213 20240101010101\r\n");
}

#[tokio::test]
async fn malformed_commands() {
    let root = tempfile::tempdir().unwrap();
    spawn_server("127.0.0.1:2133", root.path());

    let mut client = Client::connect("127.0.0.1:2133").await;
    client.login_anonymous().await;

    let reply = client.cmd("XYZZY").await;
    assert!(reply.starts_with("502"), "got: {reply}");
    let reply = client.cmd("TYPE Q").await;
    assert!(reply.starts_with("501"), "got: {reply}");
    let reply = client.cmd("MKD").await;
    assert!(reply.starts_with("501"), "got: {reply}");
    let reply = client.cmd("PORT 1,2,3").await;
    assert!(reply.starts_with("501"), "got: {reply}");
    let reply = client.cmd("REST later").await;
    assert!(reply.starts_with("501"), "got: {reply}");

    // The session survives all of that.
    let reply = client.cmd("NOOP").await;
    assert!(reply.starts_with("200"), "got: {reply}");
}

#[tokio::test]
async fn session_limit_refuses_with_421() {
    let root = tempfile::tempdir().unwrap();
    let server = lanftp::Server::with_root(root.path()).max_sessions(1);
    tokio::spawn(server.listen("127.0.0.1:2134"));

    let _first = Client::connect("127.0.0.1:2134").await;
    let mut second = Client::connect_raw("127.0.0.1:2134").await;
    let reply = second.read_reply().await;
    assert!(reply.starts_with("421"), "got: {reply}");
}

#[tokio::test]
async fn concurrent_uploads() {
    let root = tempfile::tempdir().unwrap();
    spawn_server("127.0.0.1:2135", root.path());

    async fn upload(name: &str, payload: &[u8]) {
        let mut client = Client::connect("127.0.0.1:2135").await;
        client.login_anonymous().await;
        client.cmd("TYPE I").await;
        let data_addr = client.pasv().await;
        let mut data = TcpStream::connect(data_addr).await.unwrap();
        let reply = client.cmd(&format!("STOR {name}")).await;
        assert!(reply.starts_with("150"), "got: {reply}");
        data.write_all(payload).await.unwrap();
        data.shutdown().await.unwrap();
        drop(data);
        let reply = client.read_reply().await;
        assert!(reply.starts_with("226"), "got: {reply}");
    }

    let one = tokio::spawn(upload("one.bin", b"first file"));
    let two = tokio::spawn(upload("two.bin", b"second file"));
    one.await.unwrap();
    two.await.unwrap();

    assert_eq!(std::fs::read(root.path().join("one.bin")).unwrap(), b"first file");
    assert_eq!(std::fs::read(root.path().join("two.bin")).unwrap(), b"second file");
}

// Homes every account at a fixed subdirectory of the share.
#[derive(Debug)]
struct HomedAuthenticator {
    home: PathBuf,
}

#[async_trait::async_trait]
impl Authenticator for HomedAuthenticator {
    async fn authenticate(&self, username: &str, _password: &str) -> Result<UserAccount, AuthError> {
        Ok(UserAccount::new(username, self.home.clone(), Permissions::full()))
    }
}

#[tokio::test]
async fn account_home_confines_the_session() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("secret.txt"), b"top secret").unwrap();
    std::fs::create_dir(root.path().join("sub")).unwrap();
    std::fs::write(root.path().join("sub/inside.txt"), b"fine").unwrap();

    let server = lanftp::Server::with_root(root.path()).authenticator(Arc::new(HomedAuthenticator {
        home: root.path().join("sub"),
    }));
    tokio::spawn(server.listen("127.0.0.1:2137"));

    let mut client = Client::connect("127.0.0.1:2137").await;
    client.login("kas", "whatever").await;

    // A root-level file does not exist inside the account home.
    let data_addr = client.pasv().await;
    let mut data = TcpStream::connect(data_addr).await.unwrap();
    let reply = client.cmd("RETR secret.txt").await;
    assert!(reply.starts_with("150"), "got: {reply}");
    let mut leaked = Vec::new();
    data.read_to_end(&mut leaked).await.unwrap();
    assert!(leaked.is_empty(), "data connection leaked: {leaked:?}");
    let reply = client.read_reply().await;
    assert!(reply.starts_with("550"), "got: {reply}");

    // Climbing out of the home is rejected outright.
    let reply = client.cmd("RETR ../secret.txt").await;
    assert!(reply.starts_with("550"), "got: {reply}");
    let reply = client.cmd("MDTM secret.txt").await;
    assert!(reply.starts_with("550"), "got: {reply}");

    // Listings come from the home, not the share root.
    let data_addr = client.pasv().await;
    let mut data = TcpStream::connect(data_addr).await.unwrap();
    let reply = client.cmd("LIST").await;
    assert!(reply.starts_with("150"), "got: {reply}");
    let mut listing = String::new();
    data.read_to_string(&mut listing).await.unwrap();
    client.read_reply().await;
    assert!(listing.contains("inside.txt"), "listing was: {listing}");
    assert!(!listing.contains("secret.txt"), "listing was: {listing}");
}

#[tokio::test]
async fn failed_transfer_clears_the_restart_offset() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("alpha.txt"), b"abcdefgh").unwrap();
    spawn_server("127.0.0.1:2138", root.path());

    let mut client = Client::connect("127.0.0.1:2138").await;
    client.login_anonymous().await;
    client.cmd("TYPE I").await;

    let data_addr = client.pasv().await;
    let mut data = TcpStream::connect(data_addr).await.unwrap();
    let reply = client.cmd("REST 4").await;
    assert!(reply.starts_with("350"), "got: {reply}");
    let reply = client.cmd("RETR missing.txt").await;
    assert!(reply.starts_with("150"), "got: {reply}");
    let mut none = Vec::new();
    data.read_to_end(&mut none).await.unwrap();
    let reply = client.read_reply().await;
    assert!(reply.starts_with("550"), "got: {reply}");

    // The stale offset must not apply to the next transfer.
    let data_addr = client.pasv().await;
    let mut data = TcpStream::connect(data_addr).await.unwrap();
    let reply = client.cmd("RETR alpha.txt").await;
    assert!(reply.starts_with("150"), "got: {reply}");
    let mut full = Vec::new();
    data.read_to_end(&mut full).await.unwrap();
    assert_eq!(full, b"abcdefgh");
    client.read_reply().await;
}

#[tokio::test]
async fn reversed_passive_range_is_a_startup_error() {
    let root = tempfile::tempdir().unwrap();
    let err = lanftp::Server::with_root(root.path())
        .passive_ports(50100..=50000)
        .listen("127.0.0.1:2139")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("passive port"), "got: {err}");
}

#[tokio::test]
async fn graceful_shutdown_notifies_sessions() {
    let root = tempfile::tempdir().unwrap();
    let (trigger, fired) = tokio::sync::oneshot::channel::<()>();
    let server = lanftp::Server::with_root(root.path()).shutdown_grace_period(Duration::from_secs(5));
    let handle = tokio::spawn(server.listen_until("127.0.0.1:2136", async {
        fired.await.ok();
    }));

    let mut client = Client::connect("127.0.0.1:2136").await;
    client.login_anonymous().await;

    trigger.send(()).unwrap();
    let reply = client.read_reply().await;
    assert!(reply.starts_with("421"), "got: {reply}");
    handle.await.unwrap().unwrap();
}
