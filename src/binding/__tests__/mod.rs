#[cfg(test)]
mod command;

#[cfg(test)]
mod method;

#[cfg(test)]
mod proxy;

#[cfg(test)]
mod signature;
