use std::thread;
use std::time::Duration;

use picfly_types::Command;
use tokio::time::timeout;

use crate::controller::ChannelSet;

#[tokio::test]
async fn hook_thread_send_reaches_async_receiver() {
    let channels = ChannelSet::new(4);
    let tx = channels.commands.0.clone();
    let rx = channels.commands.1.clone().to_async();

    // Stands in for the OS hook callback: sync, never awaits
    let hook = thread::spawn(move || {
        tracing::debug!("hook thread: sending command");
        tx.try_send(Command::ClipboardUpload)
    });
    assert!(hook.join().unwrap().unwrap());

    let result = timeout(Duration::from_secs(2), rx.recv()).await;
    match result {
        Ok(Ok(command)) => assert_eq!(command, Command::ClipboardUpload),
        Ok(Err(e)) => panic!("Channel error: {e}"),
        Err(_) => panic!("Timeout - command never crossed from the hook thread"),
    }
}

#[tokio::test]
async fn full_queue_drops_instead_of_blocking() {
    let channels = ChannelSet::new(1);
    let tx = channels.commands.0.clone();
    let rx = channels.commands.1.clone().to_async();

    assert!(tx.try_send(Command::CaptureUpload).unwrap());
    assert!(!tx.try_send(Command::CaptureOcr).unwrap());

    let first = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
    assert_eq!(first, Command::CaptureUpload);
    assert!(rx.is_empty());
}

#[tokio::test]
async fn commands_keep_key_down_order() {
    let channels = ChannelSet::new(8);
    let tx = channels.commands.0.clone();
    let rx = channels.commands.1.clone().to_async();

    let sent = [Command::ClipboardOcr, Command::CaptureUpload, Command::Quit];
    thread::spawn(move || {
        for command in sent {
            let _ = tx.try_send(command);
        }
    })
    .join()
    .unwrap();

    for expected in sent {
        let got = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(got, expected);
    }
}

#[test]
fn zero_capacity_is_raised_to_one() {
    let channels = ChannelSet::new(0);
    assert!(channels.commands.0.try_send(Command::Quit).unwrap());
}
