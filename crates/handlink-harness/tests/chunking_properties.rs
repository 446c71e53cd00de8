//! Property-based tests for stream handling over the simulated network.
//!
//! However a command stream is cut into TCP writes, and however long the
//! pauses between writes, the scene must end up in the same state as when
//! the whole stream arrives at once.

use std::time::Duration;

use handlink_harness::{SimHub, SimServer, create_shared_hub};
use handlink_server::scene::{DEFAULT_OBJECT_NAME, SceneObject};
use proptest::prelude::*;
use tokio::io::AsyncWriteExt;
use turmoil::net::TcpStream;

const STREAM: &[u8] = b"MOVE:LEFT\nPINCH:320,240\nPEACE:LEFT\nnot a command\nPEACE:LEFT\n\
VECTOR:1.5,-2\nMOVE:UP\nCAMERA:1,0,0\nPEACE:RIGHT\nMOVE:CENTER\n";

/// Deliver `chunks` in order with `pause` between writes and return the
/// resulting default object.
fn deliver(chunks: Vec<Vec<u8>>, pause: Duration) -> SceneObject {
    let mut sim = turmoil::Builder::new().build();
    let hub = create_shared_hub();

    let server_hub = SimHub::clone(&hub);
    sim.host("server", move || {
        let hub = SimHub::clone(&server_hub);
        async move {
            SimServer::bind("0.0.0.0:12340", hub).await?.run().await?;
            Ok(())
        }
    });

    sim.client("client", async move {
        let mut stream = TcpStream::connect("server:12340").await?;
        for chunk in chunks {
            stream.write_all(&chunk).await?;
            tokio::time::sleep(pause).await;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(())
    });

    sim.run().unwrap();

    let hub = hub.try_lock().unwrap();
    let id = hub.scene().find(DEFAULT_OBJECT_NAME).unwrap();
    hub.scene().object(id).unwrap().clone()
}

fn split(stream: &[u8], cuts: &[usize]) -> Vec<Vec<u8>> {
    let mut cuts: Vec<usize> = cuts.iter().map(|cut| cut % stream.len()).collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut chunks = Vec::new();
    let mut start = 0;
    for cut in cuts {
        chunks.push(stream[start..cut].to_vec());
        start = cut;
    }
    chunks.push(stream[start..].to_vec());
    chunks
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_chunking_never_changes_the_scene(
        cuts in prop::collection::vec(any::<usize>(), 0..20),
        pause_ms in 0..60u64,
    ) {
        let expected = deliver(vec![STREAM.to_vec()], Duration::ZERO);
        let actual = deliver(split(STREAM, &cuts), Duration::from_millis(pause_ms));

        prop_assert_eq!(actual, expected);
    }
}
