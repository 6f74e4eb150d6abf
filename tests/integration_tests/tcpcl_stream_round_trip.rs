// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use dtn_bundle_core::cl::source::Source;
use dtn_bundle_core::cl::stream::{read_frame, StreamManager};
use tokio::net::{TcpListener, TcpStream};

#[tokio::test]
async fn bundle_bytes_survive_a_round_trip_through_the_stream_manager() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let client = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
    let (server_stream, peer) = listener.accept().await.unwrap();
    let client_stream = client.await.unwrap();

    let manager = StreamManager::new();
    let conn = manager.add(server_stream, peer);
    assert_eq!(manager.len(), 1);

    let bundle_bytes = b"primary+canonical-bytes".to_vec();
    conn.forward(&bundle_bytes).await.unwrap();

    let mut client_stream = client_stream;
    let frame = read_frame(&mut client_stream).await.unwrap();
    assert_eq!(&frame[..], &bundle_bytes[..]);

    conn.stop().await;
    assert_eq!(manager.len(), 1, "stop only requests removal, never removes directly");
    manager.drain_removals().await;
    assert_eq!(manager.len(), 0);
    assert!(!conn.ready_to_forward());
}
