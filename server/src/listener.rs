use std::{io, sync::Arc};

use anyhow::anyhow;
use log::{debug, error, info};
use tokio::{
    net::{lookup_host, TcpListener, TcpSocket},
    select,
};

use crate::{client::Client, connection::Connection, context::Context, shutdown::Shutdown};

/// Pending connections the kernel may queue before we accept them.
pub const BACKLOG: u32 = 5;

/// Binds a listener with `SO_REUSEADDR` on the first address `host` resolves to
/// that accepts the bind.
pub async fn bind(host: &str, port: u16) -> io::Result<TcpListener> {
    let mut last_error = None;

    for address in lookup_host((host, port)).await? {
        let socket = if address.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;

        if let Err(err) = socket.bind(address) {
            debug!("failed to bind {}: {}", address, err);
            last_error = Some(err);
            continue;
        }

        return socket.listen(BACKLOG);
    }

    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{} did not resolve to any address", host),
        )
    }))
}

/// Accepts connections until `shutdown` fires, handing each one to its own
/// task. Workers are not tracked; they finish or time out on their own.
pub async fn serve(listener: TcpListener, context: Arc<Context>, mut shutdown: Shutdown) {
    loop {
        select! {
            res = listener.accept() => {
                match res {
                    Ok((stream, address)) => {
                        debug!("new connection from {}", address);

                        let context = context.clone();
                        tokio::spawn(async move {
                            Client::new(Connection::new(stream), address, context).run().await;
                        });
                    },
                    Err(err) => error!("failed to accept connection: {:#}", anyhow!(err)),
                }
            }
            _ = shutdown.recv() => break
        }
    }

    info!("no longer accepting connections");
}
