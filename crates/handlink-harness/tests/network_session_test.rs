//! End-to-end sessions over turmoil's simulated network.
//!
//! A real connection handler and rotation ticker run on the "server" host;
//! clients write raw protocol lines (or drive the tracking client) and then
//! inspect the shared scene from inside the simulation.

use std::time::Duration;

use handlink_client::{ConnectedClient, ScriptedProvider, Tracker, connect_with_retry};
use handlink_core::{MovementMode, SessionConfig, Vec3, poses::HandPose};
use handlink_harness::{SimEnv, SimHub, SimServer, create_shared_hub};
use handlink_proto::{GestureEvent, MoveDirection};
use handlink_server::{
    ConnectionConfig,
    scene::{DEFAULT_OBJECT_NAME, Face, SceneObject, Selection},
};
use tokio::io::AsyncWriteExt;
use turmoil::{Sim, net::TcpStream};

const SERVER: &str = "server:12340";

fn serve(sim: &mut Sim<'_>, hub: &SimHub) {
    serve_with(sim, hub, ConnectionConfig::default());
}

fn serve_with(sim: &mut Sim<'_>, hub: &SimHub, config: ConnectionConfig) {
    let hub = SimHub::clone(hub);
    sim.host("server", move || {
        let hub = SimHub::clone(&hub);
        let config = config.clone();
        async move {
            SimServer::bind_with_config("0.0.0.0:12340", hub, config).await?.run().await?;
            Ok(())
        }
    });
}

async fn cube(hub: &SimHub) -> SceneObject {
    let hub = hub.lock().await;
    let id = hub.scene().find(DEFAULT_OBJECT_NAME).unwrap();
    hub.scene().object(id).unwrap().clone()
}

async fn selection(hub: &SimHub) -> Option<Selection> {
    hub.lock().await.scene().selection()
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[test]
fn split_writes_are_reassembled() {
    let mut sim = turmoil::Builder::new().build();
    let hub = create_shared_hub();
    serve(&mut sim, &hub);

    sim.client("client", async move {
        let mut stream = TcpStream::connect(SERVER).await?;

        for chunk in [&b"MOVE:LE"[..], b"FT\nMOVE:U", b"P", b"\n"] {
            stream.write_all(chunk).await?;
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        settle().await;

        assert_eq!(cube(&hub).await.position, Vec3::new(-5.0, 0.0, 5.0));
        Ok(())
    });

    sim.run().unwrap();
}

#[test]
fn malformed_lines_do_not_end_the_session() {
    let mut sim = turmoil::Builder::new().build();
    let hub = create_shared_hub();
    serve(&mut sim, &hub);

    sim.client("client", async move {
        let mut stream = TcpStream::connect(SERVER).await?;

        stream.write_all(b"garbage\nVECTOR:1\nPINCH:a,b\nCONTROL_END:x\nMOVE:RIGHT\n").await?;
        settle().await;

        assert_eq!(cube(&hub).await.position, Vec3::new(5.0, 0.0, 0.0));
        Ok(())
    });

    sim.run().unwrap();
}

#[test]
fn pinch_cooldown_is_per_connection() {
    let mut sim = turmoil::Builder::new().build();
    let hub = create_shared_hub();
    serve(&mut sim, &hub);

    sim.client("client", async move {
        let mut first = TcpStream::connect(SERVER).await?;
        let mut second = TcpStream::connect(SERVER).await?;
        let face = |hub: SimHub| async move { selection(&hub).await.and_then(|s| s.face) };

        first.write_all(b"PINCH:320,240\n").await?;
        settle().await;
        assert_eq!(face(SimHub::clone(&hub)).await, Some(Face::Front));

        // Inside the first connection's cooldown.
        first.write_all(b"PINCH:230,150\n").await?;
        settle().await;
        assert_eq!(face(SimHub::clone(&hub)).await, Some(Face::Front));

        // A different connection has its own cooldown.
        second.write_all(b"PINCH:230,150\n").await?;
        settle().await;
        assert_eq!(face(SimHub::clone(&hub)).await, Some(Face::Top));

        tokio::time::sleep(Duration::from_millis(500)).await;
        first.write_all(b"PINCH:400,240\n").await?;
        settle().await;
        assert_eq!(face(SimHub::clone(&hub)).await, Some(Face::Right));
        Ok(())
    });

    sim.run().unwrap();
}

#[test]
fn rotation_stops_once_samples_go_stale() {
    let mut sim = turmoil::Builder::new().build();
    let hub = create_shared_hub();
    serve(&mut sim, &hub);

    sim.client("client", async move {
        let mut stream = TcpStream::connect(SERVER).await?;

        stream.write_all(b"PINCH:320,240\n").await?;
        for _ in 0..3 {
            stream.write_all(b"POINT_DIR:40,0,0\n").await?;
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert_eq!(hub.lock().await.rotating().count(), 1);

        // Samples stopped; the ticker keeps turning until they are stale.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(hub.lock().await.rotating().count(), 0);

        let stopped_at = cube(&hub).await.rotation;
        assert!(stopped_at.yaw > 0.0);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(cube(&hub).await.rotation, stopped_at);
        Ok(())
    });

    sim.run().unwrap();
}

#[test]
fn finger_channel_leaves_the_scene_alone() {
    let mut sim = turmoil::Builder::new().build();
    let hub = create_shared_hub();
    serve_with(&mut sim, &hub, ConnectionConfig::default().finger_only());

    sim.client("client", async move {
        let mut stream = TcpStream::connect(SERVER).await?;

        stream.write_all(b"MOVE:LEFT\nPINCH:320,240\n0,100,120;1,140,90\n").await?;
        settle().await;

        assert_eq!(cube(&hub).await.position, Vec3::ZERO);
        assert_eq!(selection(&hub).await, None);
        Ok(())
    });

    sim.run().unwrap();
}

#[test]
fn create_commands_reach_the_command_processor() {
    let mut sim = turmoil::Builder::new().build();
    let hub = create_shared_hub();
    serve(&mut sim, &hub);

    sim.client("client", async move {
        let mut stream = TcpStream::connect(SERVER).await?;

        stream
            .write_all(
                b"CREATE:create box\nCREATE:create cube Lid\n\
                  CREATE:select Lid Face5\nCREATE:delete Nope\n",
            )
            .await?;
        settle().await;

        let hub = hub.lock().await;
        let scene = hub.scene();
        insta::assert_snapshot!(scene.history().join("\n"), @r"
        create box
        create cube Lid
        select Lid Face5
        delete Nope
        ");

        let lid = scene.find("Lid").unwrap();
        assert_eq!(scene.selection(), Some(Selection { object: lid, face: Some(Face::Top) }));
        assert_eq!(scene.objects().count(), 3);
        Ok(())
    });

    sim.run().unwrap();
}

#[test]
fn client_retries_until_the_server_is_up() {
    let mut sim = turmoil::Builder::new().build();
    let hub = create_shared_hub();

    let server_hub = SimHub::clone(&hub);
    sim.host("server", move || {
        let hub = SimHub::clone(&server_hub);
        async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            SimServer::bind("0.0.0.0:12340", hub).await?.run().await?;
            Ok(())
        }
    });

    sim.client("client", async move {
        let stream = connect_with_retry(
            || TcpStream::connect(SERVER),
            5,
            Duration::from_secs(1),
            &SimEnv::new(),
        )
        .await?;

        let client = ConnectedClient::spawn(stream);
        client.send(GestureEvent::Move { dir: MoveDirection::Left }).await?;
        client.close().await;
        settle().await;

        assert_eq!(cube(&hub).await.position, Vec3::new(-5.0, 0.0, 0.0));
        Ok(())
    });

    sim.run().unwrap();
}

#[test]
fn tracked_fist_drag_moves_the_default_object() {
    let mut sim = turmoil::Builder::new().build();
    let hub = create_shared_hub();
    serve(&mut sim, &hub);

    sim.client("client", async move {
        let stream = TcpStream::connect(SERVER).await?;
        let client = ConnectedClient::spawn(stream);

        let script = ScriptedProvider::default()
            .hold(&HandPose::fist(), 3)
            .drag(&HandPose::fist(), 0.0, -0.1, 10)
            .hold(&HandPose::open(), 3);
        let session = SessionConfig {
            movement_mode: MovementMode::Vector,
            emit_finger_tracking: false,
            ..SessionConfig::default()
        };
        let tracker = Tracker::new(script, session, SimEnv::new(), Duration::from_millis(50));

        let stats = tracker.run(&client).await?;
        client.close().await;
        settle().await;

        assert_eq!(stats.frames, 16);
        let position = cube(&hub).await.position;
        assert!(position.z > 0.0, "dragging up should move the object forward: {position:?}");
        assert_eq!(position.x, 0.0);
        Ok(())
    });

    sim.run().unwrap();
}
