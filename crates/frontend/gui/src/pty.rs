//! Master side of the console pty carrying UART traffic.
//!
//! The master stays nonblocking; the main loop polls it once per frame and
//! moves single bytes in each direction. A hangup (the slave side closing)
//! is reported so the loop can open a fresh master and announce the new
//! slave path.

#[derive(Debug, Default, Clone, Copy)]
pub struct PtyStatus {
    pub readable: bool,
    pub hangup: bool,
}

#[cfg(unix)]
mod imp {
    use super::PtyStatus;
    use std::ffi::CStr;
    use std::io;
    use std::os::unix::io::RawFd;

    pub struct Pty {
        fd: RawFd,
    }

    impl Pty {
        pub fn open() -> io::Result<Self> {
            let fd = unsafe { libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY) };
            if fd < 0 {
                return Err(io::Error::last_os_error());
            }
            let pty = Pty { fd };
            unsafe {
                if libc::grantpt(fd) != 0 || libc::unlockpt(fd) != 0 {
                    return Err(io::Error::last_os_error());
                }
                let flags = libc::fcntl(fd, libc::F_GETFL);
                if flags < 0 || libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) < 0 {
                    return Err(io::Error::last_os_error());
                }
            }
            Ok(pty)
        }

        /// Path a terminal program should open to talk to the machine.
        pub fn slave_name(&self) -> io::Result<String> {
            let name = unsafe { libc::ptsname(self.fd) };
            if name.is_null() {
                return Err(io::Error::last_os_error());
            }
            Ok(unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned())
        }

        /// Zero-timeout poll for readability and hangup. An interrupted
        /// poll reads as "nothing pending" and gets retried next frame.
        pub fn status(&self) -> io::Result<PtyStatus> {
            let mut pfd = libc::pollfd {
                fd: self.fd,
                events: libc::POLLIN,
                revents: 0,
            };
            let n = unsafe { libc::poll(&mut pfd, 1, 0) };
            if n < 0 {
                let err = io::Error::last_os_error();
                return if err.kind() == io::ErrorKind::Interrupted {
                    Ok(PtyStatus::default())
                } else {
                    Err(err)
                };
            }
            Ok(PtyStatus {
                readable: pfd.revents & libc::POLLIN != 0,
                hangup: pfd.revents & (libc::POLLERR | libc::POLLHUP) != 0,
            })
        }

        /// Nonblocking single-byte read; `Ok(None)` when nothing is queued.
        pub fn read_byte(&self) -> io::Result<Option<u8>> {
            let mut byte = 0u8;
            let n = unsafe { libc::read(self.fd, &mut byte as *mut u8 as *mut libc::c_void, 1) };
            match n {
                1 => Ok(Some(byte)),
                0 => Err(io::ErrorKind::UnexpectedEof.into()),
                _ => {
                    let err = io::Error::last_os_error();
                    if err.kind() == io::ErrorKind::WouldBlock {
                        Ok(None)
                    } else {
                        Err(err)
                    }
                }
            }
        }

        /// Best-effort single-byte write; a full master buffer drops the
        /// byte like a real line would.
        pub fn write_byte(&self, byte: u8) -> io::Result<()> {
            let n = unsafe { libc::write(self.fd, &byte as *const u8 as *const libc::c_void, 1) };
            if n == 1 {
                return Ok(());
            }
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::WouldBlock {
                Ok(())
            } else {
                Err(err)
            }
        }
    }

    impl Drop for Pty {
        fn drop(&mut self) {
            unsafe {
                libc::close(self.fd);
            }
        }
    }
}

#[cfg(unix)]
pub use imp::Pty;

#[cfg(not(unix))]
mod imp {
    use super::PtyStatus;
    use std::io;

    /// Serial console is only available on Unix hosts.
    pub struct Pty;

    impl Pty {
        pub fn open() -> io::Result<Self> {
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "pty console requires a Unix host",
            ))
        }

        pub fn slave_name(&self) -> io::Result<String> {
            unreachable!()
        }

        pub fn status(&self) -> io::Result<PtyStatus> {
            Ok(PtyStatus::default())
        }

        pub fn read_byte(&self) -> io::Result<Option<u8>> {
            Ok(None)
        }

        pub fn write_byte(&self, _byte: u8) -> io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(not(unix))]
pub use imp::Pty;
